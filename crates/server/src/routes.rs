//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::session::session_middleware;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let regional_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/upload_aws", post(handlers::upload_aws))
        .route("/upload_sss", post(handlers::upload_sss))
        .route(
            "/serve_upload/{division}/{state}/{kind}/{filename}",
            get(handlers::serve_upload),
        )
        // Liveness check, no session required
        .route("/health", get(handlers::health_check));

    let admin_routes = Router::new()
        .route(
            "/admin",
            get(handlers::admin_login_page).post(handlers::admin_login),
        )
        .route("/admin_logout", get(handlers::admin_logout))
        .route("/admin_dashboard", get(handlers::admin_dashboard))
        .route("/admin_update_sales", post(handlers::admin_update_sales))
        .route(
            "/admin_delete/{stockist_code}/{kind}",
            get(handlers::admin_delete),
        )
        .route(
            "/admin_download_stockist_master",
            get(handlers::export_master),
        )
        .route(
            "/admin_download_stockist_master/{division}",
            get(handlers::export_division_master),
        )
        .route("/admin_download_all", get(handlers::archive_all))
        .route(
            "/admin_download_division_all_states/{division}",
            get(handlers::archive_division),
        )
        .route(
            "/admin_downloads_state/{division}/{state}/{kind}",
            get(handlers::archive_folder),
        )
        .route("/admin_downloads_page", get(handlers::downloads_page));

    let mut router = Router::new().merge(regional_routes).merge(admin_routes);

    // The metrics endpoint is unauthenticated; keep it network-restricted.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: TraceLayer -> Session -> Body limit -> Handler
    router
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
