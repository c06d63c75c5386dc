//! In-memory form of the stockist master table.
//!
//! A [`Table`] is an ordered list of column names plus rows of text cells. It is
//! always loaded whole, mutated in memory and written back whole; there is no
//! partial persistence. Columns outside the declared [`Column`] schema are kept
//! verbatim so a load/save cycle never drops data.

use crate::document::DocumentKind;
use crate::error::{Error, Result};
use crate::schema::{Column, SUBMITTED};
use serde::Serialize;
use std::collections::BTreeSet;

/// Ordered columns plus rows of string cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Owned view of one row over the declared columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StockistRecord {
    pub division: String,
    pub state: String,
    pub rbm_hq: String,
    pub abm_hq: String,
    pub bm_hq: String,
    pub stockist_code: String,
    pub stockist_name: String,
    pub rbm_email: String,
    pub abm_email: String,
    pub zbm_email: String,
    pub aws_status: String,
    pub sss_status: String,
    pub sales_value: String,
    pub aws_file: String,
    pub sss_file: String,
    pub aws_submitted_by: String,
    pub sss_submitted_by: String,
    pub submission_date: String,
}

impl StockistRecord {
    pub fn aws_submitted(&self) -> bool {
        self.aws_status == SUBMITTED
    }

    pub fn sss_submitted(&self) -> bool {
        self.sss_status == SUBMITTED
    }

    /// Whether `email` appears in any routing column (case-insensitive).
    pub fn routes_to(&self, email: &str) -> bool {
        [&self.rbm_email, &self.abm_email, &self.zbm_email]
            .into_iter()
            .any(|stored| email_matches(stored, email))
    }

    /// Stored filename recorded for `kind`, empty when nothing was uploaded.
    pub fn stored_file(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Aws => &self.aws_file,
            DocumentKind::Sss => &self.sss_file,
        }
    }

    pub fn in_division(&self, division: &str) -> bool {
        division_matches(&self.division, division)
    }
}

/// Submitted/pending counts over the two tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub aws_submitted: usize,
    pub aws_pending: usize,
    pub sss_submitted: usize,
    pub sss_pending: usize,
}

/// Case-insensitive email comparison; an empty email never matches.
pub fn email_matches(stored: &str, email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && stored.trim().to_lowercase() == email.to_lowercase()
}

/// Case-insensitive division comparison.
pub fn division_matches(stored: &str, division: &str) -> bool {
    stored.to_uppercase() == division.to_uppercase()
}

impl Table {
    /// An empty table carrying exactly the declared columns.
    pub fn with_schema() -> Self {
        Self {
            columns: Column::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from raw header and rows.
    ///
    /// Rows are padded with empty cells (or truncated) to the header width, and
    /// rows with no non-empty cell are dropped.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Declared columns absent from this table, in schema order.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|column| self.column_index(column.as_str()).is_none())
            .collect()
    }

    /// Append any missing declared column, filled with empty cells.
    ///
    /// Returns the columns that were added.
    pub fn ensure_columns(&mut self) -> Vec<Column> {
        let missing = self.missing_columns();
        for column in &missing {
            self.columns.push(column.as_str().to_string());
            for row in &mut self.rows {
                row.push(String::new());
            }
        }
        missing
    }

    /// Cell value, or `""` when the column is absent.
    pub fn value(&self, row: usize, column: Column) -> &str {
        self.column_index(column.as_str())
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index of the first row whose `Stockist_Code` equals `code`.
    pub fn find(&self, code: &str) -> Option<usize> {
        let idx = self.column_index(Column::StockistCode.as_str())?;
        self.rows.iter().position(|row| row[idx] == code)
    }

    pub fn record(&self, row: usize) -> StockistRecord {
        let v = |column| self.value(row, column).to_string();
        StockistRecord {
            division: v(Column::Division),
            state: v(Column::State),
            rbm_hq: v(Column::RbmHq),
            abm_hq: v(Column::AbmHq),
            bm_hq: v(Column::BmHq),
            stockist_code: v(Column::StockistCode),
            stockist_name: v(Column::StockistName),
            rbm_email: v(Column::RbmEmail),
            abm_email: v(Column::AbmEmail),
            zbm_email: v(Column::ZbmEmail),
            aws_status: v(Column::AwsStatus),
            sss_status: v(Column::SssStatus),
            sales_value: v(Column::SalesValue),
            aws_file: v(Column::AwsFile),
            sss_file: v(Column::SssFile),
            aws_submitted_by: v(Column::AwsSubmittedBy),
            sss_submitted_by: v(Column::SssSubmittedBy),
            submission_date: v(Column::SubmissionDate),
        }
    }

    pub fn records(&self) -> Vec<StockistRecord> {
        (0..self.rows.len()).map(|row| self.record(row)).collect()
    }

    /// Look up a stockist by code.
    pub fn get(&self, code: &str) -> Option<StockistRecord> {
        self.find(code).map(|row| self.record(row))
    }

    /// Overwrite the named columns of the first row keyed by `code`.
    ///
    /// Other cells of that row, and all other rows, are left untouched. Returns
    /// [`Error::StockistNotFound`] without modifying anything if no row matches.
    pub fn update(&mut self, code: &str, assignments: &[(Column, String)]) -> Result<()> {
        let row = self
            .find(code)
            .ok_or_else(|| Error::StockistNotFound(code.to_string()))?;
        self.ensure_columns();
        for (column, value) in assignments {
            // ensure_columns guarantees every declared column exists
            if let Some(idx) = self.column_index(column.as_str()) {
                self.rows[row][idx] = value.clone();
            }
        }
        Ok(())
    }

    /// Append a row built from declared-column assignments.
    ///
    /// The portal never creates rows itself; this seeds tables for imports and tests.
    pub fn push_row(&mut self, values: &[(Column, &str)]) {
        self.ensure_columns();
        let mut row = vec![String::new(); self.columns.len()];
        for (column, value) in values {
            if let Some(idx) = self.column_index(column.as_str()) {
                row[idx] = (*value).to_string();
            }
        }
        self.rows.push(row);
    }

    /// A copy containing only the rows accepted by `keep`, same columns.
    pub fn filtered(&self, keep: impl Fn(&StockistRecord) -> bool) -> Table {
        let rows = (0..self.rows.len())
            .filter(|&row| keep(&self.record(row)))
            .map(|row| self.rows[row].clone())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Rows whose division matches case-insensitively.
    pub fn filter_division(&self, division: &str) -> Table {
        self.filtered(|record| record.in_division(division))
    }

    /// Rows routed to `email` through any of the three manager columns.
    pub fn routed_to(&self, email: &str) -> Table {
        self.filtered(|record| record.routes_to(email))
    }

    /// Whether any row routes to `email`.
    pub fn contains_email(&self, email: &str) -> bool {
        Column::ROUTING_EMAILS.into_iter().any(|column| {
            (0..self.rows.len()).any(|row| email_matches(self.value(row, column), email))
        })
    }

    /// Sorted distinct division names.
    pub fn divisions(&self) -> Vec<String> {
        (0..self.rows.len())
            .map(|row| self.value(row, Column::Division).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let total = self.rows.len();
        let count = |column| {
            (0..total)
                .filter(|&row| self.value(row, column) == SUBMITTED)
                .count()
        };
        let aws_submitted = count(Column::AwsStatus);
        let sss_submitted = count(Column::SssStatus);
        Summary {
            total,
            aws_submitted,
            aws_pending: total - aws_submitted,
            sss_submitted,
            sss_pending: total - sss_submitted,
        }
    }
}
