//! Seed data and request builders.

use portal_core::{Column, Table};

pub const MAIN_ADMIN: (&str, &str) = ("admin@linuxlabs.com", "admin123");
pub const DOWNLOAD_ADMIN: (&str, &str) = ("download.admin@linuxlabs.com", "download123");
pub const IMPERIA_ADMIN: (&str, &str) = ("imperia.admin@linuxlabs.com", "imperia123");

/// Regional manager routed to S1 (IMPERIA) and S4 (META).
pub const KERALA_RBM: &str = "rbm.kerala@example.com";
/// Regional manager routed only to S3 (INFINA).
pub const GOA_ZBM: &str = "zbm.goa@example.com";

/// Four stockists across three divisions.
#[allow(dead_code)]
pub fn seed_table() -> Table {
    let mut table = Table::with_schema();
    table.push_row(&[
        (Column::Division, "IMPERIA"),
        (Column::State, "Kerala"),
        (Column::RbmHq, "Kochi"),
        (Column::StockistCode, "S1"),
        (Column::StockistName, "Alpha Pharma"),
        (Column::RbmEmail, KERALA_RBM),
        (Column::SalesValue, "100"),
    ]);
    table.push_row(&[
        (Column::Division, "IMPERIA"),
        (Column::State, "Kerala"),
        (Column::StockistCode, "S2"),
        (Column::StockistName, "Beta Traders"),
        (Column::AbmEmail, "abm.kerala@example.com"),
    ]);
    table.push_row(&[
        (Column::Division, "INFINA"),
        (Column::State, "Goa"),
        (Column::StockistCode, "S3"),
        (Column::StockistName, "Gamma Medicos"),
        (Column::ZbmEmail, "ZBM.Goa@Example.com"),
    ]);
    table.push_row(&[
        (Column::Division, "META"),
        (Column::State, "Tamil Nadu"),
        (Column::StockistCode, "S4"),
        (Column::StockistName, "Delta Drugs"),
        (Column::RbmEmail, KERALA_RBM),
    ]);
    table
}

/// Regional manager routed only to the blank-state stockist.
pub const BLANK_STATE_RBM: &str = "blank@example.com";

/// The default seed plus a META row whose state cell is empty.
#[allow(dead_code)]
pub fn seed_table_with_blank_state() -> Table {
    let mut table = seed_table();
    table.push_row(&[
        (Column::Division, "META"),
        (Column::State, ""),
        (Column::StockistCode, "S9"),
        (Column::StockistName, "Epsilon Stores"),
        (Column::RbmEmail, BLANK_STATE_RBM),
    ]);
    table
}

pub const BOUNDARY: &str = "portal-test-boundary";

/// Encode a `multipart/form-data` body with text fields and an optional file.
#[allow(dead_code)]
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
