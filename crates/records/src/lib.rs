//! Record store for the stockist submission portal.
//!
//! The stockist master lives in a single `.xlsx` workbook that is read whole and
//! rewritten whole on every mutation. This crate provides:
//! - The [`RecordStore`] trait the server depends on
//! - [`XlsxRecordStore`], the workbook-backed implementation with atomic saves
//! - [`to_xlsx_bytes`] for in-memory exports

pub mod error;
pub mod store;
pub mod xlsx;

pub use error::{RecordError, RecordResult};
pub use store::{RecordStore, SchemaMigration};
pub use xlsx::{XlsxRecordStore, to_xlsx_bytes};

use portal_core::config::PathsConfig;
use std::sync::Arc;

/// Create a record store from configuration.
pub async fn from_config(paths: &PathsConfig) -> RecordResult<Arc<dyn RecordStore>> {
    let store = XlsxRecordStore::new(&paths.master_table).await?;
    Ok(Arc::new(store) as Arc<dyn RecordStore>)
}
