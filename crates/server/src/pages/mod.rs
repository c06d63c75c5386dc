//! Server-rendered HTML views.

mod templates;

use crate::session::Flash;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use portal_core::access::AdminIdentity;
use portal_core::{DocumentKind, StockistRecord, Summary, folder_name};
use portal_storage::DivisionListing;

/// Escape text for HTML element and attribute content.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

/// Percent-encode one URL path segment.
fn path_segment(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

/// Substitute `{key}` placeholders. Values must already be escaped.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |out, (key, value)| {
        out.replace(&format!("{{{key}}}"), value)
    })
}

fn layout(title: &str, nav: &str, flashes: &[Flash], content: &str) -> String {
    let flashes: String = flashes
        .iter()
        .map(|flash| {
            fill(
                templates::FLASH,
                &[
                    ("level", flash.level.as_str()),
                    ("message", &escape(&flash.message)),
                ],
            )
        })
        .collect();
    fill(
        templates::LAYOUT,
        &[
            ("title", &escape(title)),
            ("nav", nav),
            ("flashes", &flashes),
            ("content", content),
        ],
    )
}

fn admin_nav(admin: &AdminIdentity) -> String {
    let mut nav = String::new();
    if admin.can_edit() {
        nav.push_str(r#"<a href="/admin_dashboard">Dashboard</a>"#);
    }
    nav.push_str(r#"<a href="/admin_downloads_page">Downloads</a>"#);
    nav.push_str(&format!(
        r#"<span> {} ({}) </span><a href="/admin_logout">Logout</a>"#,
        escape(&admin.email),
        escape(admin.division.label())
    ));
    nav
}

pub fn login_page(flashes: &[Flash]) -> String {
    let form = fill(
        templates::LOGIN_FORM,
        &[
            ("action", "/login"),
            ("password_field", ""),
            ("switch_link", r#"<a href="/admin">Admin sign-in</a>"#),
        ],
    );
    layout("Regional Login", "", flashes, &form)
}

pub fn admin_login_page(flashes: &[Flash]) -> String {
    let form = fill(
        templates::LOGIN_FORM,
        &[
            ("action", "/admin"),
            ("password_field", templates::PASSWORD_FIELD),
            ("switch_link", r#"<a href="/login">Regional sign-in</a>"#),
        ],
    );
    layout("Admin Login", "", flashes, &form)
}

fn summary(summary: &Summary) -> String {
    fill(
        templates::SUMMARY,
        &[
            ("total", &summary.total.to_string()),
            ("aws_submitted", &summary.aws_submitted.to_string()),
            ("aws_pending", &summary.aws_pending.to_string()),
            ("sss_submitted", &summary.sss_submitted.to_string()),
            ("sss_pending", &summary.sss_pending.to_string()),
        ],
    )
}

/// Link to a stored document, addressed the way the upload tree names folders.
pub fn upload_link(record: &StockistRecord, kind: DocumentKind) -> Option<String> {
    let file = record.stored_file(kind);
    if file.is_empty() {
        return None;
    }
    Some(format!(
        "/serve_upload/{}/{}/{}/{}",
        path_segment(&folder_name(&record.division)),
        path_segment(&folder_name(&record.state)),
        kind.as_str(),
        path_segment(file)
    ))
}

fn document_cell(record: &StockistRecord, kind: DocumentKind) -> String {
    let status = match kind {
        DocumentKind::Aws => &record.aws_status,
        DocumentKind::Sss => &record.sss_status,
    };
    let mut cell = if status.is_empty() {
        r#"<span class="pending">Pending</span>"#.to_string()
    } else {
        format!(r#"<span class="submitted">{}</span>"#, escape(status))
    };
    if let Some(href) = upload_link(record, kind) {
        cell.push_str(&format!(
            r#"<br><a href="{href}" target="_blank">{}</a>"#,
            escape(record.stored_file(kind))
        ));
    }
    cell
}

fn headquarters(record: &StockistRecord) -> String {
    [&record.rbm_hq, &record.abm_hq, &record.bm_hq]
        .into_iter()
        .filter(|hq| !hq.is_empty())
        .map(|hq| escape(hq))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn upload_forms(record: &StockistRecord) -> String {
    let code = escape(&record.stockist_code);
    DocumentKind::ALL
        .into_iter()
        .map(|kind| {
            let action = format!("/upload_{}", kind.as_str().to_ascii_lowercase());
            fill(
                templates::UPLOAD_FORM,
                &[
                    ("action", &action),
                    ("code", &code),
                    ("field", kind.form_field()),
                    ("kind", kind.as_str()),
                ],
            )
        })
        .collect()
}

fn record_row(record: &StockistRecord, extra_cells: &str) -> String {
    fill(
        templates::RECORD_ROW,
        &[
            ("division", &escape(&record.division)),
            ("state", &escape(&record.state)),
            ("hq", &headquarters(record)),
            ("code", &escape(&record.stockist_code)),
            ("name", &escape(&record.stockist_name)),
            ("aws", &document_cell(record, DocumentKind::Aws)),
            ("sss", &document_cell(record, DocumentKind::Sss)),
            ("sales", &escape(&record.sales_value)),
            ("submitted_at", &escape(&record.submission_date)),
            ("uploads", &upload_forms(record)),
            ("extra_cells", extra_cells),
        ],
    )
}

fn admin_actions(record: &StockistRecord) -> String {
    fill(
        templates::ADMIN_ACTIONS,
        &[
            ("code", &escape(&record.stockist_code)),
            ("code_path", &path_segment(&record.stockist_code)),
            ("sales", &escape(&record.sales_value)),
        ],
    )
}

/// Regional dashboard: the caller's rows with upload forms.
pub fn dashboard_page(
    email: &str,
    rows: &[StockistRecord],
    totals: &Summary,
    flashes: &[Flash],
) -> String {
    let nav = format!(
        r#"<span>{}</span><a href="/logout">Logout</a>"#,
        escape(email)
    );
    let body: String = rows.iter().map(|record| record_row(record, "")).collect();
    let content = summary(totals)
        + &fill(
            templates::RECORD_TABLE,
            &[("extra_header", ""), ("rows", &body)],
        );
    layout("Stockist Dashboard", &nav, flashes, &content)
}

/// Admin dashboard: role-filtered rows with edit controls and export links.
pub fn admin_dashboard_page(
    admin: &AdminIdentity,
    rows: &[StockistRecord],
    totals: &Summary,
    divisions: &[String],
    flashes: &[Flash],
) -> String {
    let mut exports = String::from("<p>Export stockist master: ");
    match admin.forced_division() {
        Some(own) => exports.push_str(&format!(
            r#"<a href="/admin_download_stockist_master">{}</a>"#,
            escape(own)
        )),
        None => {
            exports.push_str(r#"<a href="/admin_download_stockist_master">All divisions</a>"#);
            for division in divisions {
                exports.push_str(&format!(
                    r#" <a href="/admin_download_stockist_master/{}">{}</a>"#,
                    path_segment(division),
                    escape(division)
                ));
            }
        }
    }
    exports.push_str("</p>\n");

    let body: String = rows
        .iter()
        .map(|record| record_row(record, &admin_actions(record)))
        .collect();
    let content = summary(totals)
        + &exports
        + &fill(
            templates::RECORD_TABLE,
            &[("extra_header", "<th>Admin</th>"), ("rows", &body)],
        );
    layout("Admin Dashboard", &admin_nav(admin), flashes, &content)
}

/// Downloads page: division folders, their states and archive links.
pub fn downloads_page(
    admin: &AdminIdentity,
    divisions: &[DivisionListing],
    flashes: &[Flash],
) -> String {
    let mut content = String::new();
    if admin.can_download_all() {
        content.push_str(
            r#"<p><a href="/admin_download_all">All divisions (zip)</a>
<a href="/admin_download_stockist_master">Stockist master, all divisions (xlsx)</a></p>
"#,
        );
    }
    if divisions.is_empty() {
        content.push_str("<p>No uploads yet.</p>\n");
    }
    for division in divisions {
        let division_path = path_segment(&division.name);
        let states: String = division
            .states
            .iter()
            .map(|state| {
                fill(
                    templates::STATE_ROW,
                    &[
                        ("state", &escape(&state.name)),
                        ("last_updated", &escape(&state.last_updated)),
                        ("division_path", &division_path),
                        ("state_path", &path_segment(&state.name)),
                    ],
                )
            })
            .collect();
        content.push_str(&fill(
            templates::DIVISION_SECTION,
            &[
                ("division", &escape(&division.name)),
                ("division_path", &division_path),
                ("states", &states),
            ],
        ));
    }
    layout("Downloads", &admin_nav(admin), flashes, &content)
}

pub fn not_found_page() -> String {
    layout("Not Found", "", &[], templates::NOT_FOUND)
}

pub fn failure_page() -> String {
    layout("Something Went Wrong", "", &[], templates::FAILURE)
}
