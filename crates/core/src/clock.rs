//! Wall-clock stamps written into the table and archive names.
//!
//! All stamps use the host's local offset, falling back to UTC when it cannot be
//! determined (common in multi-threaded processes on Unix).

use std::time::SystemTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const SUBMISSION_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const ARCHIVE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

const LAST_UPDATED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour repr:12]:[minute] [period]");

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

/// `Submission_Date` value for a mutation happening now.
pub fn submission_timestamp() -> String {
    format_submission(now())
}

pub fn format_submission(at: OffsetDateTime) -> String {
    at.format(SUBMISSION_FORMAT).unwrap_or_default()
}

/// Suffix for archive download names, e.g. `20250301_174501`.
pub fn archive_stamp() -> String {
    now().format(ARCHIVE_FORMAT).unwrap_or_default()
}

/// Human-readable modification time for the downloads page.
pub fn format_last_updated(modified: SystemTime) -> String {
    OffsetDateTime::from(modified)
        .to_offset(local_offset())
        .format(LAST_UPDATED_FORMAT)
        .unwrap_or_default()
}
