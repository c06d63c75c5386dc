//! Record store error types.

use thiserror::Error;

/// Record store operation errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("stockist not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read table: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("failed to write table: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("invalid table layout: {0}")]
    Schema(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<portal_core::Error> for RecordError {
    fn from(err: portal_core::Error) -> Self {
        match err {
            portal_core::Error::StockistNotFound(code) => Self::NotFound(code),
            other => Self::Schema(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for RecordError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Result type for record store operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
