//! Admin row edits: sales values and document removal.

use crate::error::{PortalError, PortalResult};
use crate::handlers::common::{load_table, require_editor, update_record};
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;
use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use portal_core::access::AdminIdentity;
use portal_core::clock::submission_timestamp;
use portal_core::{Column, DocumentKind};
use portal_storage::DocumentFolder;
use serde::Deserialize;

const DASHBOARD: &str = "/admin_dashboard";

#[derive(Debug, Deserialize)]
pub struct SalesForm {
    #[serde(default)]
    pub stockist_code: String,
    #[serde(default)]
    pub sales_value: String,
}

/// What `/admin_delete` removes from a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeleteTarget {
    Document(DocumentKind),
    Sales,
}

impl DeleteTarget {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Sales" => Some(Self::Sales),
            other => other.parse().ok().map(Self::Document),
        }
    }
}

fn require_signed_in_admin(session: &CurrentSession) -> PortalResult<AdminIdentity> {
    let admin = session
        .principal()
        .admin()
        .cloned()
        .ok_or_else(|| PortalError::denied("/admin", "Please log in as Admin."))?;
    require_editor(&admin)?;
    Ok(admin)
}

/// `POST /admin_update_sales`: an empty value clears Sales_Value only.
pub async fn admin_update_sales(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<SalesForm>,
) -> PortalResult<Redirect> {
    let admin = require_signed_in_admin(&session)?;
    let code = form.stockist_code.trim();
    if code.is_empty() {
        return Err(PortalError::rejected(DASHBOARD, "Invalid stockist code."));
    }

    let table = load_table(&state).await?;
    let Some(record) = table.get(code) else {
        return Err(PortalError::rejected(DASHBOARD, "Stockist not found."));
    };
    if !admin.can_edit_record(&record) {
        return Err(PortalError::denied(DASHBOARD, "Access denied."));
    }

    let (assignments, message) = match form.sales_value.trim() {
        "" => (
            vec![(Column::SalesValue, String::new())],
            "Sales Value deleted successfully.",
        ),
        value => (
            vec![
                (Column::SalesValue, value.to_string()),
                (Column::SubmissionDate, submission_timestamp()),
            ],
            "Sales Value updated successfully!",
        ),
    };
    update_record(&state, code, &assignments).await?;

    session.flash(FlashLevel::Success, message);
    Ok(Redirect::to(DASHBOARD))
}

/// `GET /admin_delete/{code}/{kind}`: kind is `AWS`, `SSS` or `Sales`.
///
/// Removing a document deletes the stored file and clears its status and file
/// columns. Every recognised kind stamps Submission_Date.
pub async fn admin_delete(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((code, kind)): Path<(String, String)>,
) -> PortalResult<Redirect> {
    let admin = session
        .principal()
        .admin()
        .cloned()
        .ok_or_else(|| PortalError::login_required("/admin"))?;
    require_editor(&admin)?;

    let table = load_table(&state).await?;
    let Some(record) = table.get(&code) else {
        return Err(PortalError::rejected(DASHBOARD, "Stockist not found!"));
    };
    if !admin.can_edit_record(&record) {
        return Err(PortalError::denied(DASHBOARD, "Access denied."));
    }
    let Some(target) = DeleteTarget::parse(&kind) else {
        tracing::warn!(code = %code, kind = %kind, "unknown delete target");
        return Err(PortalError::rejected(
            DASHBOARD,
            format!("Unknown delete target: {kind}"),
        ));
    };

    let mut assignments = Vec::new();
    match target {
        DeleteTarget::Document(document) => {
            let stored = record.stored_file(document);
            if !stored.is_empty() {
                let folder = DocumentFolder::new(&record.division, &record.state, document);
                state.uploads.delete(&folder, stored).await?;
                assignments.push((document.status_column(), String::new()));
                assignments.push((document.file_column(), String::new()));
            }
        }
        DeleteTarget::Sales => assignments.push((Column::SalesValue, String::new())),
    }
    assignments.push((Column::SubmissionDate, submission_timestamp()));
    update_record(&state, &code, &assignments).await?;

    tracing::info!(code = %code, kind = %kind, admin = %admin.email, "row entry deleted");
    session.flash(FlashLevel::Info, format!("{kind} deleted and Excel updated!"));
    Ok(Redirect::to(DASHBOARD))
}
