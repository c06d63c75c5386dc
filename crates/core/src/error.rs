//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("stockist not found: {0}")]
    StockistNotFound(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("invalid document kind: {0} (expected AWS or SSS)")]
    InvalidDocumentKind(String),

    #[error("invalid admin role: {0} (expected main, division or download)")]
    InvalidRole(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
