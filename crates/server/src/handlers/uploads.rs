//! Document submission handlers.

use crate::error::{PortalError, PortalResult};
use crate::handlers::common::{load_table, update_record};
use crate::metrics;
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::Redirect;
use portal_core::clock::submission_timestamp;
use portal_core::{Column, DocumentKind, SUBMITTED};
use portal_storage::DocumentFolder;
use tracing::instrument;

/// Fields of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    stockist_code: String,
    sales_value: String,
    /// Original filename and content of the submitted document.
    file: Option<(String, Bytes)>,
}

async fn read_form(kind: DocumentKind, mut multipart: Multipart) -> PortalResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "stockist_code" => form.stockist_code = field.text().await?,
            "sales_value" => form.sales_value = field.text().await?,
            name if name == kind.form_field() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.file = Some((filename, data));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// `POST /upload_aws`
pub async fn upload_aws(
    State(state): State<AppState>,
    session: CurrentSession,
    multipart: Multipart,
) -> PortalResult<Redirect> {
    submit(&state, &session, DocumentKind::Aws, multipart).await
}

/// `POST /upload_sss`
pub async fn upload_sss(
    State(state): State<AppState>,
    session: CurrentSession,
    multipart: Multipart,
) -> PortalResult<Redirect> {
    submit(&state, &session, DocumentKind::Sss, multipart).await
}

/// Store the document, then mark the row submitted.
///
/// The file is written before the table, so a failed table save leaves the
/// new file in place with the row unchanged.
#[instrument(skip_all, fields(kind = %kind))]
async fn submit(
    state: &AppState,
    session: &CurrentSession,
    kind: DocumentKind,
    multipart: Multipart,
) -> PortalResult<Redirect> {
    let principal = session.principal();
    let Some(submitter) = principal.email().map(str::to_string) else {
        return Err(PortalError::denied("/login", "Please login first."));
    };
    let back = if principal.is_admin() {
        "/admin_dashboard"
    } else {
        "/dashboard"
    };

    let form = read_form(kind, multipart).await?;
    let code = form.stockist_code.trim();
    let table = load_table(state).await?;
    let Some(record) = table.get(code) else {
        return Err(PortalError::rejected(back, "Stockist not found!"));
    };
    if !principal.can_submit_for(&record) {
        tracing::warn!(code = %code, submitter = %submitter, "upload outside caller's rows");
        return Err(PortalError::denied(back, "Access denied."));
    }
    let Some((original, data)) = form.file.filter(|(name, _)| !name.is_empty()) else {
        return Err(PortalError::rejected(back, "No file selected!"));
    };

    let folder = DocumentFolder::new(&record.division, &record.state, kind);
    let size = data.len() as u64;
    let filename = state
        .uploads
        .save(&folder, &record.stockist_name, code, &original, data)
        .await?;

    let sales_value = match form.sales_value.trim() {
        "" => record.sales_value.clone(),
        value => value.to_string(),
    };
    update_record(
        state,
        code,
        &[
            (Column::SalesValue, sales_value),
            (kind.status_column(), SUBMITTED.to_string()),
            (kind.file_column(), filename.clone()),
            (kind.submitted_by_column(), submitter.clone()),
            (Column::SubmissionDate, submission_timestamp()),
        ],
    )
    .await?;

    metrics::UPLOADS.with_label_values(&[kind.as_str()]).inc();
    metrics::UPLOAD_BYTES.inc_by(size);
    tracing::info!(
        code = %code,
        file = %filename,
        submitter = %submitter,
        bytes = size,
        "document submitted"
    );

    session.flash(
        FlashLevel::Success,
        format!("{kind} uploaded for {}", record.stockist_name),
    );
    Ok(Redirect::to(back))
}
