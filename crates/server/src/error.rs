//! Portal error types and how they surface to the browser.
//!
//! Access and validation failures become a flash notice plus a redirect.
//! Missing files get a plain 404 page; anything else is logged and rendered
//! as the generic failure page.

use crate::pages;
use crate::session::{Flash, FlashLevel, PendingFlash};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use portal_records::RecordError;
use portal_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// No usable session; send the caller to the given login page.
    #[error("login required")]
    LoginRequired(String),

    /// Not allowed; redirect with a "danger" notice.
    #[error("access denied: {message}")]
    Denied { redirect: String, message: String },

    /// Request could not be carried out; redirect with a "warning" notice.
    #[error("rejected: {message}")]
    Rejected { redirect: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("record error: {0}")]
    Records(#[from] RecordError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn login_required(login: impl Into<String>) -> Self {
        Self::LoginRequired(login.into())
    }

    pub fn denied(redirect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Denied {
            redirect: redirect.into(),
            message: message.into(),
        }
    }

    pub fn rejected(redirect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            redirect: redirect.into(),
            message: message.into(),
        }
    }

    /// HTTP status of the response this error produces.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::LoginRequired(_) | Self::Denied { .. } | Self::Rejected { .. } => {
                StatusCode::SEE_OTHER
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Multipart(e) => e.status(),
            Self::Records(RecordError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::NotFound(_) | StorageError::InvalidKey(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Records(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::LoginRequired(login) => Redirect::to(&login).into_response(),
            Self::Denied { redirect, message } => {
                flash_redirect(&redirect, Flash::new(FlashLevel::Danger, message))
            }
            Self::Rejected { redirect, message } => {
                flash_redirect(&redirect, Flash::new(FlashLevel::Warning, message))
            }
            Self::Multipart(e) => {
                tracing::warn!(error = %e, "unreadable upload form");
                e.into_response()
            }
            err if status == StatusCode::NOT_FOUND => {
                tracing::debug!(error = %err, "not found");
                (status, Html(pages::not_found_page())).into_response()
            }
            err => {
                tracing::error!(error = %err, "request failed");
                (status, Html(pages::failure_page())).into_response()
            }
        }
    }
}

fn flash_redirect(to: &str, flash: Flash) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.extensions_mut().insert(PendingFlash(flash));
    response
}

/// Result type for portal handlers.
pub type PortalResult<T> = Result<T, PortalError>;
