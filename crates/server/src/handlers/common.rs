//! Shared handler helpers.

use crate::error::{PortalError, PortalResult};
use crate::metrics;
use crate::session::CurrentSession;
use crate::state::AppState;
use axum::body::Body;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use portal_core::access::AdminIdentity;
use portal_core::{Column, Table};
use std::time::Instant;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The signed-in admin, or a redirect to the admin sign-in page.
pub fn require_admin(session: &CurrentSession) -> PortalResult<AdminIdentity> {
    session
        .principal()
        .admin()
        .cloned()
        .ok_or_else(|| PortalError::login_required("/admin"))
}

/// Download admins are sent back to the only page they may use.
pub fn require_editor(admin: &AdminIdentity) -> PortalResult<()> {
    if admin.can_edit() {
        Ok(())
    } else {
        Err(PortalError::rejected(
            "/admin_downloads_page",
            "You only have access to the download page.",
        ))
    }
}

pub async fn load_table(state: &AppState) -> PortalResult<Table> {
    Ok(state.records.load().await?)
}

/// Apply `assignments` to one row and rewrite the table, recording save metrics.
pub async fn update_record(
    state: &AppState,
    code: &str,
    assignments: &[(Column, String)],
) -> PortalResult<()> {
    let start = Instant::now();
    let result = state.records.update(code, assignments).await;
    metrics::TABLE_SAVE_DURATION.observe(start.elapsed().as_secs_f64());

    match result {
        Ok(()) => {
            metrics::TABLE_SAVES.inc();
            tracing::info!(
                code = %code,
                fields = assignments.len(),
                "stockist row updated"
            );
            Ok(())
        }
        Err(e) => {
            metrics::TABLE_SAVE_FAILURES.inc();
            Err(e.into())
        }
    }
}

/// Response carrying a file, either as a download or shown inline.
pub fn file_response(
    filename: &str,
    content_type: &str,
    size: Option<u64>,
    inline: bool,
    body: Body,
) -> Response {
    let disposition = if inline { "inline" } else { "attachment" };
    let disposition = format!("{disposition}; filename=\"{}\"", filename.replace('"', ""));
    let mut response = (
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response();
    if let Some(size) = size {
        response.headers_mut().insert(CONTENT_LENGTH, size.into());
    }
    response
}

/// Content type for a stored document, from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match portal_core::filename::extension(filename)
        .trim_start_matches('.')
        .to_ascii_lowercase()
        .as_str()
    {
        "pdf" => "application/pdf",
        "xlsx" => XLSX_CONTENT_TYPE,
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
