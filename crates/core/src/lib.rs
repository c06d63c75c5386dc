//! Core domain types and shared logic for the stockist submission portal.
//!
//! This crate defines the data model used by all other crates:
//! - The declared column schema and the in-memory master table
//! - Document kinds (AWS / SSS submission tracks)
//! - Administrator roles and the division access policy
//! - Upload filename sanitizing
//! - Configuration

pub mod access;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod filename;
pub mod schema;
pub mod table;

pub use access::{AdminIdentity, AdminRole, DivisionScope, Principal};
pub use document::DocumentKind;
pub use error::{Error, Result};
pub use filename::{folder_name, secure_filename, upload_filename};
pub use schema::{Column, SUBMITTED};
pub use table::{StockistRecord, Summary, Table};
