//! Snapshot export/import implementation.

use crate::model::entry::{Collection, Entry, EntryId};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Semantic version tag written into every exported snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

const SNAPSHOT_FILE_PREFIX: &str = "snipdeck-backup";

pub type CodecResult<T> = Result<T, CodecError>;

/// Import payload errors. The live collection is untouched on any of these.
#[derive(Debug)]
pub enum CodecError {
    /// Payload is valid JSON but neither accepted shape.
    Format(String),
    /// Payload is not JSON at all.
    Json(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(message) => write!(f, "unsupported import format: {message}"),
            Self::Json(err) => write!(f, "import payload is not valid JSON: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(_) => None,
            Self::Json(err) => Some(err),
        }
    }
}

/// Point-in-time copy of the collection plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    /// RFC 3339 / ISO-8601 UTC timestamp of generation.
    pub timestamp: String,
    pub data: Collection,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> CodecResult<String> {
        serde_json::to_string_pretty(self).map_err(CodecError::Json)
    }
}

/// Exports the collection stamped with the current time.
pub fn export_snapshot(entries: &[Entry]) -> Snapshot {
    export_snapshot_at(entries, Utc::now())
}

/// Exports the collection stamped with `generated_at`.
pub fn export_snapshot_at(entries: &[Entry], generated_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        data: entries.to_vec(),
    }
}

/// Default export file name, e.g. `snipdeck-backup-2024-03-09.json`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{SNAPSHOT_FILE_PREFIX}-{}.json", date.format("%Y-%m-%d"))
}

/// Decoded import payload plus the field-level issues found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub entries: Collection,
    pub issues: Vec<ImportIssue>,
}

/// Parses an import payload into a collection.
///
/// Accepts a snapshot object carrying a `data` array, or a bare entry array
/// written by older versions. `version` and `timestamp` are not checked.
/// Records are trusted: `null` text fields become empty and a record without
/// an id gets a fresh one.
///
/// # Errors
/// - `Json` when `raw` is not JSON.
/// - `Format` for any other top-level shape, or an element that is not an
///   entry object.
pub fn import_snapshot(raw: &str) -> CodecResult<Collection> {
    import_report(raw).map(|report| report.entries)
}

/// Same as [`import_snapshot`], also returning [`inspect_import`] issues
/// computed before missing ids are filled in.
pub fn import_report(raw: &str) -> CodecResult<ImportReport> {
    let mut entries = decode_entries(raw)?;
    let issues = inspect_import(&entries);
    for entry in entries.iter_mut().filter(|entry| entry.id.is_empty()) {
        entry.id = Uuid::new_v4().to_string();
    }
    Ok(ImportReport { entries, issues })
}

fn decode_entries(raw: &str) -> CodecResult<Collection> {
    let value = serde_json::from_str::<Value>(raw).map_err(CodecError::Json)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(CodecError::Format(format!(
                    "`data` must be an array, got {}",
                    json_kind(&other)
                )));
            }
            None => {
                return Err(CodecError::Format(
                    "object payload has no `data` field".to_string(),
                ));
            }
        },
        other => {
            return Err(CodecError::Format(format!(
                "expected an entry array or a snapshot object, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Entry>(item)
                .map_err(|err| CodecError::Format(format!("entry #{index}: {err}")))
        })
        .collect()
}

/// Field-level problem found in an imported collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportIssue {
    BlankTitle { index: usize },
    BlankTrigger { index: usize },
    MissingId { index: usize },
    DuplicateId { index: usize, id: EntryId },
}

impl Display for ImportIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle { index } => write!(f, "entry #{index} has a blank title"),
            Self::BlankTrigger { index } => write!(f, "entry #{index} has a blank trigger"),
            Self::MissingId { index } => write!(f, "entry #{index} has no id"),
            Self::DuplicateId { index, id } => {
                write!(f, "entry #{index} repeats id `{id}`")
            }
        }
    }
}

/// Reports entries that would fail create/update validation, plus missing
/// and repeated ids.
///
/// Import still trusts these records; callers decide whether to surface them.
pub fn inspect_import(entries: &[Entry]) -> Vec<ImportIssue> {
    let mut issues = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        if entry.title.trim().is_empty() {
            issues.push(ImportIssue::BlankTitle { index });
        }
        if entry.trigger.trim().is_empty() {
            issues.push(ImportIssue::BlankTrigger { index });
        }
        if entry.id.is_empty() {
            issues.push(ImportIssue::MissingId { index });
        } else if !seen_ids.insert(entry.id.as_str()) {
            issues.push(ImportIssue::DuplicateId {
                index,
                id: entry.id.clone(),
            });
        }
    }

    issues
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
