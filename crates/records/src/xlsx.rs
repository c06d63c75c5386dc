//! `.xlsx`-backed record store.

use crate::error::{RecordError, RecordResult};
use crate::store::{RecordStore, SchemaMigration};
use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx, open_workbook};
use portal_core::Table;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Record store persisting the table as the first worksheet of one workbook.
pub struct XlsxRecordStore {
    path: PathBuf,
}

impl XlsxRecordStore {
    /// Create a store for the workbook at `path`.
    ///
    /// The parent directory is created; the workbook itself is created lazily by
    /// [`RecordStore::load`] or [`RecordStore::ensure_schema`].
    pub async fn new(path: impl AsRef<Path>) -> RecordResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn exists(&self) -> RecordResult<bool> {
        Ok(fs::try_exists(&self.path).await?)
    }

    async fn read(&self) -> RecordResult<Table> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_table(&path)).await?
    }

    /// Write to a uniquely named sibling, fsync, then rename over the workbook.
    ///
    /// The temp file is removed if any step fails, leaving the workbook untouched.
    async fn write_atomic(&self, data: &[u8]) -> RecordResult<()> {
        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let temp_path = self.path.with_file_name(
            self.path
                .file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or_else(|| temp_name.clone()),
        );

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for XlsxRecordStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> RecordResult<Table> {
        if !self.exists().await? {
            tracing::info!("master table missing, creating it with the declared columns");
            let table = Table::with_schema();
            self.save(&table).await?;
            return Ok(table);
        }
        let mut table = self.read().await?;
        table.ensure_columns();
        Ok(table)
    }

    #[instrument(skip(self, table), fields(path = %self.path.display(), rows = table.len()))]
    async fn save(&self, table: &Table) -> RecordResult<()> {
        let snapshot = table.clone();
        let bytes = tokio::task::spawn_blocking(move || to_xlsx_bytes(&snapshot)).await??;
        self.write_atomic(&bytes).await?;
        tracing::debug!(bytes = bytes.len(), "master table saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn ensure_schema(&self) -> RecordResult<SchemaMigration> {
        if !self.exists().await? {
            self.save(&Table::with_schema()).await?;
            return Ok(SchemaMigration::Created);
        }
        let mut table = self.read().await?;
        let added = table.ensure_columns();
        if added.is_empty() {
            return Ok(SchemaMigration::Unchanged);
        }
        self.save(&table).await?;
        Ok(SchemaMigration::Backfilled(added))
    }

    async fn health_check(&self) -> RecordResult<()> {
        self.read().await.map(|_| ())
    }
}

/// Read the first worksheet: header row, then data rows as text.
pub fn read_table(path: &Path) -> RecordResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(RecordError::Schema("workbook has no worksheets".to_string())),
    };

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let columns = rows.next().unwrap_or_default();
    Ok(Table::from_parts(columns, rows.collect()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Codes and amounts typed into the sheet by hand arrive as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Render a table as a single-sheet workbook with a bold header row.
pub fn to_xlsx_bytes(table: &Table) -> RecordResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, column_number(col)?, name, &header)?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_number = u32::try_from(idx + 1)
            .map_err(|_| RecordError::Schema(format!("too many rows: {}", idx + 1)))?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet.write_string(row_number, column_number(col)?, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_number(col: usize) -> RecordResult<u16> {
    u16::try_from(col).map_err(|_| RecordError::Schema(format!("too many columns: {}", col + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::Column;

    #[test]
    fn test_cell_text_normalizes_whole_floats() {
        assert_eq!(cell_text(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("S1".to_string())), "S1");
    }

    #[test]
    fn test_bytes_roundtrip_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");

        let mut table = Table::with_schema();
        table.push_row(&[(Column::StockistCode, "S1"), (Column::SalesValue, "12500")]);
        std::fs::write(&path, to_xlsx_bytes(&table).unwrap()).unwrap();

        let read = read_table(&path).unwrap();
        assert_eq!(read, table);
    }

    #[test]
    fn test_oversized_cell_fails_to_render() {
        let mut table = Table::with_schema();
        let huge = "x".repeat(40_000);
        table.push_row(&[(Column::StockistCode, "S1"), (Column::SalesValue, huge.as_str())]);
        assert!(matches!(to_xlsx_bytes(&table), Err(RecordError::Write(_))));
    }

    #[tokio::test]
    async fn test_load_creates_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("master.xlsx");
        let store = XlsxRecordStore::new(&path).await.unwrap();

        let table = store.load().await.unwrap();
        assert!(table.is_empty());
        assert!(table.missing_columns().is_empty());
        assert!(path.exists());
    }
}
