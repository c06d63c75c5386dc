//! Path-safe naming for stored uploads.

use crate::document::DocumentKind;
use unicode_normalization::UnicodeNormalization;

/// Reduce `name` to a single safe path component.
///
/// Compatibility-decomposes the input and drops non-ASCII, turns path separators
/// into spaces, joins whitespace-separated words with `_`, removes everything
/// outside `[A-Za-z0-9_.-]` and trims leading/trailing `.` and `_`. The result may
/// be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Folder used for a division or state cell that sanitizes to nothing.
pub const UNASSIGNED_FOLDER: &str = "Unassigned";

/// Upload-tree folder name for a division or state cell.
///
/// Blank and fully non-ASCII cells all share [`UNASSIGNED_FOLDER`], so such rows
/// still get a stable `division/state/kind` location.
pub fn folder_name(raw: &str) -> String {
    let safe = secure_filename(raw);
    if safe.is_empty() {
        UNASSIGNED_FOLDER.to_string()
    } else {
        safe
    }
}

/// Extension of an uploaded filename including the dot, or `""`.
///
/// Only the final path component is considered, and leading dots do not start
/// an extension (`.env` has none).
pub fn extension(filename: &str) -> &str {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let stem_start = base.len() - base.trim_start_matches('.').len();
    match base[stem_start..].rfind('.') {
        Some(dot) => &base[stem_start + dot..],
        None => "",
    }
}

/// Deterministic stored name for a stockist's document.
///
/// Depends only on the stockist, the kind and the uploaded file's extension, so
/// a re-upload lands on the same name and replaces the previous file.
pub fn upload_filename(
    stockist_name: &str,
    stockist_code: &str,
    kind: DocumentKind,
    original_filename: &str,
) -> String {
    secure_filename(&format!(
        "{stockist_name}_{stockist_code}_{kind}{}",
        extension(original_filename)
    ))
}
