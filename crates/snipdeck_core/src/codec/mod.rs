//! Backup/restore snapshot codec.
//!
//! # Responsibility
//! - Wrap the full collection into a versioned, timestamped snapshot.
//! - Normalize accepted import shapes back into a collection.
//!
//! # Invariants
//! - Export never mutates the collection it reads.
//! - Import accepts `{ "data": [...] }` or a bare `[...]`; nothing else.
//! - Imported entries are not field-validated; `inspect_import` only reports.
//! - A record without an id is kept under a freshly generated id.

pub mod snapshot;

pub use snapshot::{
    export_snapshot, export_snapshot_at, import_report, import_snapshot, inspect_import,
    snapshot_file_name, CodecError, CodecResult, ImportIssue, ImportReport, Snapshot,
    SNAPSHOT_VERSION,
};
