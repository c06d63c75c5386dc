//! Application state shared across handlers.

use crate::session::SessionStore;
use portal_core::config::AppConfig;
use portal_records::RecordStore;
use portal_storage::UploadStore;
use std::sync::Arc;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Stockist master table.
    pub records: Arc<dyn RecordStore>,
    /// Uploaded documents.
    pub uploads: Arc<UploadStore>,
    /// Live browser sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new application state with an empty session store.
    pub fn new(
        config: AppConfig,
        records: Arc<dyn RecordStore>,
        uploads: Arc<UploadStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            records,
            uploads,
            sessions: SessionStore::new(),
        }
    }
}
