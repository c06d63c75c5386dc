//! Downloads page, table exports, archives and stored-file serving.

use crate::error::{PortalError, PortalResult};
use crate::handlers::common::{
    XLSX_CONTENT_TYPE, content_type_for, file_response, load_table, require_admin,
};
use crate::metrics;
use crate::pages;
use crate::session::CurrentSession;
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{Html, Response};
use futures::TryStreamExt;
use portal_core::clock::archive_stamp;
use portal_core::{DocumentKind, Principal, folder_name, secure_filename};
use portal_records::{RecordError, to_xlsx_bytes};
use portal_storage::{DocumentFolder, build_archive};
use serde::Serialize;

const DOWNLOADS: &str = "/admin_downloads_page";

/// `GET /admin_downloads_page`
pub async fn downloads_page(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PortalResult<Html<String>> {
    let admin = require_admin(&session)?;
    let divisions = state.uploads.division_tree(&admin.folder_scope()).await?;
    Ok(Html(pages::downloads_page(
        &admin,
        &divisions,
        &session.take_flashes(),
    )))
}

/// `GET /admin_download_stockist_master`
pub async fn export_master(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PortalResult<Response> {
    export(&state, &session, None).await
}

/// `GET /admin_download_stockist_master/{division}`
pub async fn export_division_master(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(division): Path<String>,
) -> PortalResult<Response> {
    export(&state, &session, Some(division)).await
}

/// Export the table as `.xlsx`. Division admins always get their own
/// division, whatever was requested.
async fn export(
    state: &AppState,
    session: &CurrentSession,
    requested: Option<String>,
) -> PortalResult<Response> {
    let admin = require_admin(session)?;
    let table = load_table(state).await?;

    let requested = requested.filter(|division| !division.trim().is_empty());
    let (view, filename) = match (admin.forced_division(), requested) {
        (Some(own), _) => (
            table.filter_division(own),
            format!("{}_Stockist_Master.xlsx", secure_filename(own)),
        ),
        (None, Some(division)) => (
            table.filter_division(&division),
            format!("{}_Stockist_Master.xlsx", secure_filename(&division)),
        ),
        (None, None) => (table, "All_Divisions_Stockist_Master.xlsx".to_string()),
    };

    let rows = view.len();
    let bytes = tokio::task::spawn_blocking(move || to_xlsx_bytes(&view))
        .await
        .map_err(RecordError::from)??;
    metrics::TABLE_EXPORTS.inc();
    tracing::info!(file = %filename, rows, "stockist master exported");

    let size = bytes.len() as u64;
    Ok(file_response(
        &filename,
        XLSX_CONTENT_TYPE,
        Some(size),
        false,
        Body::from(bytes),
    ))
}

/// `GET /admin_download_all`: every file under the upload root.
pub async fn archive_all(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PortalResult<Response> {
    let admin = require_admin(&session)?;
    if !admin.can_download_all() {
        return Err(PortalError::denied(DOWNLOADS, "Access denied."));
    }
    let name = format!("All_Divisions_Uploads_{}.zip", archive_stamp());
    send_archive(&state, &[], name, "all", "Upload folder not found.").await
}

/// `GET /admin_download_division_all_states/{division}`
pub async fn archive_division(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(division): Path<String>,
) -> PortalResult<Response> {
    let admin = require_admin(&session)?;
    let division = folder_name(&division);
    if !admin.can_access_folder(&division) {
        return Err(PortalError::denied(
            DOWNLOADS,
            "Access denied for this division.",
        ));
    }
    let name = format!("{division}_All_States_{}.zip", archive_stamp());
    send_archive(
        &state,
        &[&division],
        name,
        "division",
        "Division folder not found.",
    )
    .await
}

/// `GET /admin_downloads_state/{division}/{state}/{kind}`
pub async fn archive_folder(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((division, state_name, kind)): Path<(String, String, String)>,
) -> PortalResult<Response> {
    let admin = require_admin(&session)?;
    let division = folder_name(&division);
    let state_name = folder_name(&state_name);
    let kind = folder_name(&kind);
    if !admin.can_access_folder(&division) {
        return Err(PortalError::denied(DOWNLOADS, "Access denied."));
    }
    let name = format!("{division}_{state_name}_{kind}_{}.zip", archive_stamp());
    send_archive(
        &state,
        &[&division, &state_name, &kind],
        name,
        "folder",
        "Folder not found.",
    )
    .await
}

/// Zip a subtree into scratch space and stream it; the scratch file goes away
/// with the stream.
async fn send_archive(
    state: &AppState,
    segments: &[&str],
    name: String,
    scope: &str,
    missing: &str,
) -> PortalResult<Response> {
    let Some(subtree) = state.uploads.subtree(segments).await? else {
        return Err(PortalError::rejected(DOWNLOADS, missing));
    };

    let archive = build_archive(
        state.uploads.root(),
        &subtree,
        &state.config.paths.scratch_dir,
    )
    .await?;
    metrics::ARCHIVES_BUILT.with_label_values(&[scope]).inc();
    metrics::ARCHIVED_FILES.inc_by(archive.file_count() as u64);
    tracing::info!(
        archive = %name,
        files = archive.file_count(),
        bytes = archive.size(),
        "sending archive"
    );

    let size = archive.size();
    let stream = archive
        .into_stream()
        .map_err(|e| std::io::Error::other(e.to_string()));
    Ok(file_response(
        &name,
        "application/zip",
        Some(size),
        false,
        Body::from_stream(stream),
    ))
}

/// `GET /serve_upload/{division}/{state}/{kind}/{filename}`: any signed-in
/// caller; division admins only within their division.
pub async fn serve_upload(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((division, state_name, kind, filename)): Path<(String, String, String, String)>,
) -> PortalResult<Response> {
    let principal = session.principal();
    if !principal.is_authenticated() {
        return Err(PortalError::login_required("/login"));
    }
    if !principal.can_read_division(&division) {
        let home = match principal {
            Principal::Admin(_) => DOWNLOADS,
            _ => "/dashboard",
        };
        return Err(PortalError::denied(home, "Access denied."));
    }
    let kind: DocumentKind = secure_filename(&kind)
        .parse()
        .map_err(|_| PortalError::NotFound(format!("no {kind} folder")))?;

    let folder = DocumentFolder::new(division, state_name, kind);
    let stored = state.uploads.open(&folder, &filename).await?;
    let filename = secure_filename(&filename);
    Ok(file_response(
        &filename,
        content_type_for(&filename),
        Some(stored.size),
        true,
        Body::from_stream(stored.stream.map_err(|e| std::io::Error::other(e.to_string()))),
    ))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`: table readable and upload root present.
pub async fn health_check(State(state): State<AppState>) -> PortalResult<Json<HealthResponse>> {
    state.records.health_check().await?;
    state.uploads.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
