//! Regional and admin dashboards.

use crate::error::{PortalError, PortalResult};
use crate::handlers::common::{load_table, require_admin, require_editor};
use crate::pages;
use crate::session::CurrentSession;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Html;
use portal_core::Principal;

/// `GET /dashboard`: rows routed to the signed-in regional manager.
pub async fn dashboard(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PortalResult<Html<String>> {
    let Principal::Regional { email } = session.principal() else {
        return Err(PortalError::login_required("/login"));
    };

    let table = load_table(&state).await?.routed_to(&email);
    Ok(Html(pages::dashboard_page(
        &email,
        &table.records(),
        &table.summary(),
        &session.take_flashes(),
    )))
}

/// `GET /admin_dashboard`: every row, or the admin's own division.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PortalResult<Html<String>> {
    let admin = require_admin(&session)?;
    require_editor(&admin)?;

    let table = load_table(&state).await?;
    let divisions = table.divisions();
    let table = match admin.forced_division() {
        Some(division) => table.filter_division(division),
        None => table,
    };

    Ok(Html(pages::admin_dashboard_page(
        &admin,
        &table.records(),
        &table.summary(),
        &divisions,
        &session.take_flashes(),
    )))
}
