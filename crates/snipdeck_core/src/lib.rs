//! Core domain logic for SnipDeck, a personal snippet launcher.
//! This crate is the single source of truth for store, matching and
//! selection behavior; UI and host glue live in the ffi/cli crates.

pub mod codec;
pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod session;

pub use codec::{
    export_snapshot, import_report, import_snapshot, inspect_import, snapshot_file_name,
    CodecError, ImportIssue, ImportReport, Snapshot,
};
pub use config::{ConfigError, LauncherConfig};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{Collection, Entry, EntryDraft, EntryId, EntryValidationError};
pub use repo::item_store::{ItemStore, StoreError, StoreResult};
pub use search::matcher::{match_entries, search_entries, Candidate, MatchQuery, MatchRank};
pub use session::activation::{ActivationEvent, Screen};
pub use session::host::{HostBridge, HostCommand, HostError, QueuedHost};
pub use session::launcher::Launcher;
pub use session::selection::{KeyEvent, SelectionController, SelectionOutcome, SelectionState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
