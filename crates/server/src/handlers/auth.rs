//! Sign-in and sign-out handlers.

use crate::error::PortalResult;
use crate::handlers::common::load_table;
use crate::metrics::record_login;
use crate::pages;
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;
use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use portal_core::Principal;
use portal_core::access::AdminRole;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /`: send the caller to the page matching their session.
pub async fn index(session: CurrentSession) -> Redirect {
    match session.principal() {
        Principal::Regional { .. } => Redirect::to("/dashboard"),
        Principal::Admin(_) => Redirect::to("/admin_dashboard"),
        Principal::Anonymous => Redirect::to("/login"),
    }
}

pub async fn login_page(session: CurrentSession) -> Html<String> {
    Html(pages::login_page(&session.take_flashes()))
}

/// `POST /login`: any routing email present in the table signs in.
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<LoginForm>,
) -> PortalResult<Response> {
    let email = form.email.trim().to_lowercase();
    let table = load_table(&state).await?;

    if table.contains_email(&email) {
        session.login(Principal::Regional {
            email: email.clone(),
        });
        session.flash(FlashLevel::Success, "Login successful!");
        record_login("regional", true);
        tracing::info!(email = %email, "regional login");
        return Ok(Redirect::to("/dashboard").into_response());
    }

    record_login("regional", false);
    tracing::warn!(email = %email, "unrecognised regional email");
    session.flash(FlashLevel::Danger, "Unauthorized email!");
    Ok(Html(pages::login_page(&session.take_flashes())).into_response())
}

/// `GET /logout`
pub async fn logout(session: CurrentSession) -> Redirect {
    session.logout();
    session.flash(FlashLevel::Info, "Logged out successfully.");
    Redirect::to("/login")
}

pub async fn admin_login_page(session: CurrentSession) -> Html<String> {
    Html(pages::admin_login_page(&session.take_flashes()))
}

/// `POST /admin`: check the configured admin accounts.
pub async fn admin_login(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    let Some(admin) = state.config.admin.authenticate(&form.email, &form.password) else {
        record_login("admin", false);
        tracing::warn!(email = %form.email.trim(), "rejected admin login");
        session.flash(FlashLevel::Danger, "Invalid credentials!");
        return Html(pages::admin_login_page(&session.take_flashes())).into_response();
    };

    record_login("admin", true);
    tracing::info!(
        email = %admin.email,
        role = %admin.role,
        division = %admin.division.label(),
        "admin login"
    );
    let landing = if admin.role == AdminRole::Download {
        "/admin_downloads_page"
    } else {
        "/admin_dashboard"
    };
    session.login(Principal::Admin(admin));
    session.flash(FlashLevel::Success, "Admin login successful!");
    Redirect::to(landing).into_response()
}

/// `GET /admin_logout`
pub async fn admin_logout(session: CurrentSession) -> Redirect {
    session.logout();
    session.flash(FlashLevel::Info, "Admin logged out.");
    Redirect::to("/admin")
}
