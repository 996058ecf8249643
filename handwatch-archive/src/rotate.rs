//! Daily rotation of the main sensor document.
//!
//! The device appends rows to one document all day. Once the first row
//! belongs to an earlier day, the whole document is copied to
//! `<archive_dir>/Data_<date>.json` and the main document is reset to an
//! empty list.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::{ArchiveError, DocumentStore};

/// Archive name used when the first row carries no date.
pub const UNKNOWN_DATE: &str = "unknown";

/// What a rotation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// The main document does not exist.
    Missing,
    /// The main document is blank or an empty list.
    Empty,
    /// The rows are from today.
    Current,
    /// The rows were archived and the main document was reset.
    Archived { date: String, archive_path: String },
}

/// Archive the document at `path` if its first row is not from `today`.
///
/// The archive copy is written before the reset, and the reset names the
/// revision that was read. If the archive cannot be created nothing is reset;
/// if the document changed in between the reset is refused by the store.
pub async fn rotate_if_stale(
    store: &dyn DocumentStore,
    path: &str,
    archive_dir: &str,
    today: NaiveDate,
) -> Result<RotateOutcome, ArchiveError> {
    let Some(document) = store.read(path).await? else {
        return Ok(RotateOutcome::Missing);
    };
    if document.content.trim().is_empty() {
        return Ok(RotateOutcome::Empty);
    }

    let rows = match serde_json::from_str(&document.content)? {
        Value::Array(rows) => rows,
        _ => {
            return Err(ArchiveError::Parse(format!(
                "{} is not a JSON list of rows",
                path
            )))
        }
    };
    let Some(first) = rows.first() else {
        return Ok(RotateOutcome::Empty);
    };

    let today = today.format("%Y-%m-%d").to_string();
    let date = first
        .get("date")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .unwrap_or(UNKNOWN_DATE);
    if date == today {
        debug!(path, date, "rows are current");
        return Ok(RotateOutcome::Current);
    }

    let archive_path = archive_path(archive_dir, date);
    store
        .create(
            &archive_path,
            &document.content,
            &format!("Archiving data from {}", date),
        )
        .await?;
    debug!(archive = %archive_path, rows = rows.len(), "archive written");

    store
        .update(path, "[]", &document.sha, "Resetting main file for new data")
        .await?;

    Ok(RotateOutcome::Archived {
        date: date.to_string(),
        archive_path,
    })
}

/// Path of the archive copy for `date`.
pub fn archive_path(archive_dir: &str, date: &str) -> String {
    // Keep the date from introducing path segments
    let name: String = date
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let dir = archive_dir.trim_matches('/');
    if dir.is_empty() {
        format!("Data_{}.json", name)
    } else {
        format!("{}/Data_{}.json", dir, name)
    }
}
