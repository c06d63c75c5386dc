//! Integration tests for the workbook-backed record store.

use portal_core::{Column, SUBMITTED, Table};
use portal_records::{RecordError, RecordStore, SchemaMigration, XlsxRecordStore, to_xlsx_bytes};
use std::path::Path;

fn seed_table() -> Table {
    let mut table = Table::with_schema();
    table.push_row(&[
        (Column::Division, "IMPERIA"),
        (Column::State, "Kerala"),
        (Column::StockistCode, "S1"),
        (Column::StockistName, "Alpha Pharma"),
        (Column::RbmEmail, "a@x.com"),
        (Column::SalesValue, "100"),
    ]);
    table.push_row(&[
        (Column::Division, "INFINA"),
        (Column::State, "Goa"),
        (Column::StockistCode, "S2"),
        (Column::StockistName, "Beta Traders"),
        (Column::AbmEmail, "b@x.com"),
    ]);
    table
}

async fn seeded_store(dir: &Path) -> XlsxRecordStore {
    let store = XlsxRecordStore::new(dir.join("master.xlsx")).await.unwrap();
    store.save(&seed_table()).await.unwrap();
    store
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_update_changes_only_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path()).await;

    store
        .update(
            "S1",
            &[
                (Column::AwsStatus, SUBMITTED.to_string()),
                (Column::AwsFile, "Alpha_Pharma_S1_AWS.pdf".to_string()),
            ],
        )
        .await
        .unwrap();

    let after = store.load().await.unwrap();
    let mut expected = seed_table();
    expected
        .update(
            "S1",
            &[
                (Column::AwsStatus, SUBMITTED.to_string()),
                (Column::AwsFile, "Alpha_Pharma_S1_AWS.pdf".to_string()),
            ],
        )
        .unwrap();
    assert_eq!(after, expected);

    let s1 = after.get("S1").unwrap();
    assert_eq!(s1.sales_value, "100");
    assert_eq!(s1.sss_status, "");
    assert_eq!(after.get("S2").unwrap(), seed_table().get("S2").unwrap());
}

#[tokio::test]
async fn test_update_missing_code_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path()).await;
    let before = std::fs::read(store.path()).unwrap();

    let err = store
        .update("NOPE", &[(Column::SalesValue, "1".to_string())])
        .await
        .unwrap_err();

    assert!(matches!(err, RecordError::NotFound(code) if code == "NOPE"));
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn test_save_of_load_preserves_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path()).await;

    let first = store.load().await.unwrap();
    store.save(&first).await.unwrap();
    let second = store.load().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second, seed_table());
}

#[tokio::test]
async fn test_failed_save_keeps_previous_table_and_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path()).await;

    let mut broken = seed_table();
    let huge = "x".repeat(40_000);
    broken
        .update("S1", &[(Column::SalesValue, huge)])
        .unwrap();

    let err = store.save(&broken).await.unwrap_err();
    assert!(matches!(err, RecordError::Write(_)));

    assert_eq!(store.load().await.unwrap(), seed_table());
    assert_eq!(dir_entries(dir.path()), vec!["master.xlsx".to_string()]);
}

#[tokio::test]
async fn test_successful_save_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path()).await;

    store
        .update("S2", &[(Column::SssStatus, SUBMITTED.to_string())])
        .await
        .unwrap();

    assert_eq!(dir_entries(dir.path()), vec!["master.xlsx".to_string()]);
}

#[tokio::test]
async fn test_ensure_schema_backfills_and_keeps_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.xlsx");

    let legacy = Table::from_parts(
        vec![
            "Division".to_string(),
            "Stockist_Code".to_string(),
            "Region_Notes".to_string(),
        ],
        vec![vec!["META".to_string(), "M1".to_string(), "north".to_string()]],
    );
    std::fs::write(&path, to_xlsx_bytes(&legacy).unwrap()).unwrap();

    let store = XlsxRecordStore::new(&path).await.unwrap();
    let migration = store.ensure_schema().await.unwrap();
    match migration {
        SchemaMigration::Backfilled(added) => {
            assert_eq!(added.len(), Column::ALL.len() - 2);
            assert!(!added.contains(&Column::Division));
            assert!(added.contains(&Column::SubmissionDate));
        }
        other => panic!("expected backfill, got {other:?}"),
    }

    let table = store.load().await.unwrap();
    assert_eq!(&table.columns()[..3], &["Division", "Stockist_Code", "Region_Notes"]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, Column::StockistCode), "M1");
    assert_eq!(table.rows()[0][2], "north");

    assert_eq!(
        store.ensure_schema().await.unwrap(),
        SchemaMigration::Unchanged
    );
}

#[tokio::test]
async fn test_blank_rows_dropped_and_numbers_read_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.write_string(0, col as u16, column.as_str()).unwrap();
    }
    let code_col = Column::ALL
        .iter()
        .position(|c| *c == Column::StockistCode)
        .unwrap() as u16;
    sheet.write_number(1, code_col, 1001).unwrap();
    sheet.write_string(3, code_col, "S3").unwrap();
    workbook.save(&path).unwrap();

    let store = XlsxRecordStore::new(&path).await.unwrap();
    let table = store.load().await.unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.value(0, Column::StockistCode), "1001");
    assert_eq!(table.value(1, Column::StockistCode), "S3");
    assert!(table.get("1001").is_some());
}
