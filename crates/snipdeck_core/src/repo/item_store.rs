//! Item store over an injected key-value capability.
//!
//! # Invariants
//! - Insertion order is preserved; `update` edits in place.
//! - `remove` of an absent id is a no-op and performs no write.
//! - The whole collection is written as one JSON blob under `storage_key`.

use crate::codec::{self, CodecError, Snapshot};
use crate::kv::{KeyValueStore, KvError};
use crate::model::entry::{Collection, Entry, EntryDraft, EntryId, EntryValidationError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which the collection blob is stored by default.
pub const DEFAULT_STORAGE_KEY: &str = "snippets";

pub type StoreResult<T> = Result<T, StoreError>;

/// Item store error taxonomy surfaced to interactive callers.
#[derive(Debug)]
pub enum StoreError {
    /// Required field missing on create/update.
    Validation(EntryValidationError),
    /// Update targeted an id that is not in the collection.
    NotFound(EntryId),
    /// Persisted blob exists but is not a serialized collection.
    Corrupted(String),
    /// Import payload rejected by the codec.
    Codec(CodecError),
    Kv(KvError),
    /// Collection could not be encoded for persistence.
    Encode(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::Corrupted(message) => write!(f, "persisted collection is corrupted: {message}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::Encode(message) => write!(f, "failed to encode collection: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::NotFound(_) | Self::Corrupted(_) | Self::Encode(_) => None,
        }
    }
}

impl From<EntryValidationError> for StoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Single source of truth for the entry collection.
///
/// The collection is read once on [`ItemStore::open`] and served from memory
/// afterwards; every mutation writes the full collection back.
pub struct ItemStore<S: KeyValueStore> {
    kv: S,
    storage_key: String,
    entries: Collection,
}

impl<S: KeyValueStore> ItemStore<S> {
    /// Opens the store under [`DEFAULT_STORAGE_KEY`] and loads the collection.
    pub fn open(kv: S) -> StoreResult<Self> {
        Self::open_with_key(kv, DEFAULT_STORAGE_KEY)
    }

    /// Opens the store under a custom key and loads the collection.
    ///
    /// # Errors
    /// - `Corrupted` when a blob exists but does not parse.
    /// - `Kv` when the backend read fails.
    pub fn open_with_key(kv: S, storage_key: impl Into<String>) -> StoreResult<Self> {
        let mut store = Self {
            kv,
            storage_key: storage_key.into(),
            entries: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-reads the persisted collection, refreshing the in-memory copy.
    ///
    /// Returns the empty collection when nothing has been stored yet.
    pub fn load(&mut self) -> StoreResult<&[Entry]> {
        let Some(raw) = self.kv.get(&self.storage_key)? else {
            self.entries.clear();
            return Ok(&self.entries);
        };

        let entries = serde_json::from_str::<Collection>(&raw).map_err(|err| {
            error!(
                "event=store_load module=store status=error error_code=corrupted bytes={} error={}",
                raw.len(),
                err
            );
            StoreError::Corrupted(err.to_string())
        })?;

        info!(
            "event=store_load module=store status=ok entry_count={}",
            entries.len()
        );
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Current in-memory collection in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Overwrites the persisted collection wholesale.
    pub fn replace(&mut self, entries: Collection) -> StoreResult<()> {
        self.persist(&entries)?;
        self.entries = entries;
        info!(
            "event=store_replace module=store status=ok entry_count={}",
            self.entries.len()
        );
        Ok(())
    }

    /// Validates and appends a new entry with a fresh id.
    pub fn add(&mut self, draft: EntryDraft) -> StoreResult<Entry> {
        draft.validate()?;

        let entry = Entry::new(draft);
        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.persist(&next)?;
        self.entries = next;

        info!(
            "event=store_add module=store status=ok entry_count={}",
            self.entries.len()
        );
        Ok(entry)
    }

    /// Replaces the editable fields of `id` in place.
    ///
    /// # Errors
    /// - `NotFound` when `id` is absent (checked before validation).
    /// - `Validation` when the draft has a blank title or trigger.
    pub fn update(&mut self, id: &str, draft: EntryDraft) -> StoreResult<Entry> {
        let Some(position) = self.entries.iter().position(|entry| entry.id == id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        draft.validate()?;

        let mut next = self.entries.clone();
        next[position].apply(draft);
        let updated = next[position].clone();
        self.persist(&next)?;
        self.entries = next;

        info!("event=store_update module=store status=ok position={position}");
        Ok(updated)
    }

    /// Removes `id` if present. Absent ids are ignored.
    pub fn remove(&mut self, id: &str) -> StoreResult<()> {
        if !self.entries.iter().any(|entry| entry.id == id) {
            return Ok(());
        }

        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect::<Collection>();
        self.persist(&next)?;
        self.entries = next;

        info!(
            "event=store_remove module=store status=ok entry_count={}",
            self.entries.len()
        );
        Ok(())
    }

    pub fn clear(&mut self) -> StoreResult<()> {
        self.replace(Vec::new())
    }

    /// Wraps the current collection into an export snapshot.
    pub fn export_snapshot(&self) -> Snapshot {
        codec::export_snapshot(&self.entries)
    }

    /// Parses `raw` and replaces the whole collection with it.
    ///
    /// Destructive: there is no merge or undo, so callers confirm first.
    /// Field-level problems are logged but do not block the import.
    pub fn import_raw(&mut self, raw: &str) -> StoreResult<usize> {
        let report = codec::import_report(raw).map_err(|err| {
            warn!("event=store_import module=store status=error error={err}");
            err
        })?;

        for issue in &report.issues {
            warn!("event=store_import module=store status=warn issue=\"{issue}\"");
        }

        let count = report.entries.len();
        self.replace(report.entries)?;
        Ok(count)
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn persist(&self, entries: &[Entry]) -> StoreResult<()> {
        let encoded =
            serde_json::to_string(entries).map_err(|err| StoreError::Encode(err.to_string()))?;
        self.kv.set(&self.storage_key, &encoded).map_err(|err| {
            error!("event=store_persist module=store status=error error={err}");
            StoreError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemStore, StoreError, DEFAULT_STORAGE_KEY};
    use crate::kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore};
    use crate::model::entry::{EntryDraft, EntryValidationError};
    use std::cell::Cell;

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        fail_writes: Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> KvResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> KvResult<()> {
            if self.fail_writes.get() {
                return Err(KvError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn missing_blob_loads_as_empty() {
        let store = ItemStore::open(MemoryKeyValueStore::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_blob_fails_open() {
        let kv = MemoryKeyValueStore::with_value(DEFAULT_STORAGE_KEY, "{oops");
        let err = ItemStore::open(kv).err().expect("corrupt blob must fail");
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn add_rejects_blank_fields_without_mutation() {
        let mut store = ItemStore::open(MemoryKeyValueStore::new()).unwrap();
        let err = store.add(EntryDraft::new("", "Title")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(EntryValidationError::EmptyTrigger)
        ));
        assert!(store.is_empty());
        assert_eq!(store.kv().get(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn update_missing_id_reports_not_found() {
        let mut store = ItemStore::open(MemoryKeyValueStore::new()).unwrap();
        let err = store
            .update("nope", EntryDraft::new("t", "T"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let mut store = ItemStore::open(FlakyStore::default()).unwrap();
        let kept = store.add(EntryDraft::new("keep", "Keep")).unwrap();

        store.kv().fail_writes.set(true);
        assert!(store.add(EntryDraft::new("new", "New")).is_err());
        assert!(store
            .update(&kept.id, EntryDraft::new("changed", "Changed"))
            .is_err());
        assert!(store.remove(&kept.id).is_err());
        assert!(store.clear().is_err());

        assert_eq!(store.entries(), std::slice::from_ref(&kept));
    }

    #[test]
    fn import_with_bad_shape_leaves_collection() {
        let mut store = ItemStore::open(MemoryKeyValueStore::new()).unwrap();
        store.add(EntryDraft::new("a", "A")).unwrap();

        let err = store.import_raw(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_keeps_loose_records_and_persists_filled_ids() {
        let mut store = ItemStore::open(MemoryKeyValueStore::new()).unwrap();
        let count = store
            .import_raw(r#"[{"title":"A","trigger":"a","subtitle":null,"data":null}]"#)
            .unwrap();
        assert_eq!(count, 1);

        let imported = store.entries()[0].clone();
        assert!(!imported.id.is_empty());
        assert_eq!(imported.subtitle, "");
        assert_eq!(imported.data, "");

        let reopened = ItemStore::open(store.kv()).unwrap();
        assert_eq!(reopened.entries(), std::slice::from_ref(&imported));
    }
}
