//! Record store trait.

use crate::error::RecordResult;
use async_trait::async_trait;
use portal_core::{Column, Table};

/// Outcome of [`RecordStore::ensure_schema`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaMigration {
    /// The table did not exist and was created with the declared columns.
    Created,
    /// These declared columns were missing and have been added empty.
    Backfilled(Vec<Column>),
    Unchanged,
}

/// Whole-table persistence for the stockist master.
///
/// Every mutation is load, modify in memory, save. There is no locking: two
/// concurrent updates race and the later save wins in full.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every row. All declared columns are present in the result.
    async fn load(&self) -> RecordResult<Table>;

    /// Replace the persisted table atomically.
    async fn save(&self, table: &Table) -> RecordResult<()>;

    /// Create the table or backfill missing declared columns.
    async fn ensure_schema(&self) -> RecordResult<SchemaMigration>;

    /// Overwrite the named columns of the row keyed by `code` and persist.
    ///
    /// Returns [`RecordError::NotFound`](crate::RecordError::NotFound) and writes
    /// nothing if no row has that code.
    async fn update(&self, code: &str, assignments: &[(Column, String)]) -> RecordResult<()> {
        let mut table = self.load().await?;
        table.update(code, assignments)?;
        self.save(&table).await
    }

    /// Check that the table is readable.
    async fn health_check(&self) -> RecordResult<()>;
}
