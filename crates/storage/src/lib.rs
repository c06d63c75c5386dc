//! Upload storage for the stockist submission portal.
//!
//! This crate provides:
//! - The upload tree (`<division>/<state>/<KIND>/<file>`) with atomic writes
//!   and sanitized, root-confined paths
//! - Division/state listings for the downloads page
//! - Zip archives of any subtree, staged in self-deleting scratch files

pub mod archive;
pub mod error;
pub mod uploads;

pub use archive::{ScratchArchive, build_archive};
pub use error::{StorageError, StorageResult};
pub use uploads::{
    ByteStream, DivisionListing, DocumentFolder, StateListing, StoredFile, UploadStore,
};

use portal_core::config::PathsConfig;
use std::sync::Arc;

/// Open the upload tree and scratch directory from configuration.
pub async fn from_config(paths: &PathsConfig) -> StorageResult<Arc<UploadStore>> {
    tokio::fs::create_dir_all(&paths.scratch_dir).await?;
    let store = UploadStore::new(&paths.upload_root).await?;
    Ok(Arc::new(store))
}
