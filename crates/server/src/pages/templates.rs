//! HTML templates for the portal pages.
//!
//! Placeholders are `{name}`; values are escaped before substitution, and the
//! escaper also encodes braces, so substituted text never forms a placeholder.

/// Page shell shared by every view.
///
/// Placeholders:
/// - `{title}` - Page heading and window title
/// - `{nav}` - Links shown in the header
/// - `{flashes}` - Rendered flash notices
/// - `{content}` - Page body
pub const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Stockist Portal</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header { background: #1f3b57; color: #fff; padding: 0.75rem 1.5rem; display: flex; justify-content: space-between; }
header a { color: #fff; margin-left: 1rem; }
main { padding: 1.5rem; }
table { border-collapse: collapse; width: 100%; font-size: 0.9rem; margin-bottom: 1.5rem; }
th, td { border: 1px solid #ccc; padding: 0.35rem 0.5rem; text-align: left; vertical-align: top; }
th { background: #f0f3f6; }
.flash { padding: 0.6rem 1rem; margin-bottom: 0.5rem; border-radius: 4px; }
.flash.success { background: #dff0d8; }
.flash.info { background: #d9edf7; }
.flash.warning { background: #fcf8e3; }
.flash.danger { background: #f2dede; }
.summary span { margin-right: 1.5rem; }
.submitted { color: #2e7d32; font-weight: 600; }
.pending { color: #b26a00; }
form.inline { display: inline-block; margin: 0.15rem 0; }
</style>
</head>
<body>
<header><strong>Stockist Portal</strong><nav>{nav}</nav></header>
<main>
{flashes}
<h1>{title}</h1>
{content}
</main>
</body>
</html>
"#;

/// One flash notice. Placeholders: `{level}`, `{message}`.
pub const FLASH: &str = r#"<div class="flash {level}">{message}</div>
"#;

/// Sign-in form.
///
/// Placeholders:
/// - `{action}` - Form target
/// - `{password_field}` - Password input, empty for regional sign-in
/// - `{switch_link}` - Link to the other sign-in page
pub const LOGIN_FORM: &str = r#"<form method="post" action="{action}">
<p><label>Email <input type="email" name="email" required autofocus></label></p>
{password_field}
<p><button type="submit">Sign in</button></p>
</form>
<p>{switch_link}</p>
"#;

pub const PASSWORD_FIELD: &str =
    r#"<p><label>Password <input type="password" name="password" required></label></p>"#;

/// Submitted/pending counters.
pub const SUMMARY: &str = r#"<p class="summary">
<span>Total: {total}</span>
<span>AWS submitted: {aws_submitted}</span>
<span>AWS pending: {aws_pending}</span>
<span>SSS submitted: {sss_submitted}</span>
<span>SSS pending: {sss_pending}</span>
</p>
"#;

/// Stockist table. `{extra_header}` adds admin-only columns.
pub const RECORD_TABLE: &str = r#"<table>
<thead><tr>
<th>Division</th><th>State</th><th>HQ</th><th>Code</th><th>Stockist</th>
<th>AWS</th><th>SSS</th><th>Sales Value</th><th>Last Submission</th><th>Upload</th>{extra_header}
</tr></thead>
<tbody>
{rows}</tbody>
</table>
"#;

pub const RECORD_ROW: &str = r#"<tr>
<td>{division}</td><td>{state}</td><td>{hq}</td><td>{code}</td><td>{name}</td>
<td>{aws}</td><td>{sss}</td><td>{sales}</td><td>{submitted_at}</td><td>{uploads}</td>{extra_cells}
</tr>
"#;

/// Document upload for one stockist and kind.
///
/// Placeholders:
/// - `{action}` - `/upload_aws` or `/upload_sss`
/// - `{code}` - Stockist code
/// - `{field}` - Multipart field carrying the file
/// - `{kind}` - `AWS` or `SSS`
pub const UPLOAD_FORM: &str = r#"<form class="inline" method="post" action="{action}" enctype="multipart/form-data">
<input type="hidden" name="stockist_code" value="{code}">
<input type="text" name="sales_value" placeholder="Sales value" size="8">
<input type="file" name="{field}" required>
<button type="submit">Upload {kind}</button>
</form>
"#;

/// Admin sales edit and delete controls for one row.
pub const ADMIN_ACTIONS: &str = r#"<td>
<form class="inline" method="post" action="/admin_update_sales">
<input type="hidden" name="stockist_code" value="{code}">
<input type="text" name="sales_value" value="{sales}" size="8">
<button type="submit">Save</button>
</form>
<a href="/admin_delete/{code_path}/AWS">Delete AWS</a>
<a href="/admin_delete/{code_path}/SSS">Delete SSS</a>
<a href="/admin_delete/{code_path}/Sales">Clear Sales</a>
</td>"#;

/// Division section on the downloads page.
pub const DIVISION_SECTION: &str = r#"<h2>{division}</h2>
<p><a href="/admin_download_division_all_states/{division_path}">All states (zip)</a>
<a href="/admin_download_stockist_master/{division_path}">Stockist master (xlsx)</a></p>
<table>
<thead><tr><th>State</th><th>Last Updated</th><th>AWS</th><th>SSS</th></tr></thead>
<tbody>
{states}</tbody>
</table>
"#;

pub const STATE_ROW: &str = r#"<tr><td>{state}</td><td>{last_updated}</td>
<td><a href="/admin_downloads_state/{division_path}/{state_path}/AWS">AWS zip</a></td>
<td><a href="/admin_downloads_state/{division_path}/{state_path}/SSS">SSS zip</a></td></tr>
"#;

pub const NOT_FOUND: &str = r#"<p>The requested file or folder does not exist.</p>
<p><a href="/">Back to the portal</a></p>
"#;

pub const FAILURE: &str = r#"<p>The request could not be completed. Please try again.</p>
<p><a href="/">Back to the portal</a></p>
"#;
