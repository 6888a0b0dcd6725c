//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical trigger -> payload record.
//! - Provide draft validation used by create/update paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - Duplicate triggers are legal; ranking resolves them.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque entry identifier.
///
/// Kept as a plain string so identifiers from older exports (numeric or
/// hand-written) survive an import unchanged.
pub type EntryId = String;

/// Ordered entry sequence. Insertion order doubles as ranking tie-break.
pub type Collection = Vec<Entry>;

/// One trigger -> payload record managed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Empty only while an imported record without an id is being decoded.
    #[serde(default, deserialize_with = "deserialize_entry_id")]
    pub id: EntryId,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    /// Secondary display text; empty when unset.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub trigger: String,
    /// Payload copied to the clipboard on commit. May be empty.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub data: String,
}

impl Entry {
    /// Creates an entry from a draft with a freshly generated id.
    ///
    /// Does not validate; callers commit through `ItemStore::add`.
    pub fn new(draft: EntryDraft) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), draft)
    }

    /// Creates an entry with a caller-provided id.
    pub fn with_id(id: impl Into<EntryId>, draft: EntryDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            subtitle: draft.subtitle,
            trigger: draft.trigger,
            data: draft.data,
        }
    }

    /// Overwrites every editable field, keeping `id` unchanged.
    pub fn apply(&mut self, draft: EntryDraft) {
        self.title = draft.title;
        self.subtitle = draft.subtitle;
        self.trigger = draft.trigger;
        self.data = draft.data;
    }

    /// Returns the editable fields as a draft.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            trigger: self.trigger.clone(),
            data: self.data.clone(),
        }
    }
}

/// Caller-editable entry fields for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub subtitle: String,
    pub trigger: String,
    pub data: String,
}

impl EntryDraft {
    pub fn new(trigger: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    /// Validates required fields before a store mutation.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank.
    /// - `EmptyTrigger` when `trigger` is blank.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::EmptyTitle);
        }
        if self.trigger.trim().is_empty() {
            return Err(EntryValidationError::EmptyTrigger);
        }
        Ok(())
    }
}

/// Required-field violations on create/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyTitle,
    EmptyTrigger,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "entry title must not be empty"),
            Self::EmptyTrigger => write!(f, "entry trigger must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}

/// Treats `null` text fields as empty strings.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_entry_id<'de, D>(deserializer: D) -> Result<EntryId, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntryIdVisitor;

    impl Visitor<'_> for EntryIdVisitor {
        type Value = EntryId;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "a string or integer entry id")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(EntryId::new())
        }
    }

    deserializer.deserialize_any(EntryIdVisitor)
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryDraft, EntryValidationError};

    #[test]
    fn validate_rejects_blank_title_and_trigger() {
        let err = EntryDraft::new("sig", "  ").validate().unwrap_err();
        assert_eq!(err, EntryValidationError::EmptyTitle);

        let err = EntryDraft::new("", "Signature").validate().unwrap_err();
        assert_eq!(err, EntryValidationError::EmptyTrigger);

        EntryDraft::new("sig", "Signature").validate().unwrap();
    }

    #[test]
    fn null_text_fields_decode_as_empty() {
        let entry: Entry = serde_json::from_str(
            r#"{"id":7,"title":null,"trigger":"t","subtitle":null,"data":null}"#,
        )
        .unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(entry.title, "");
        assert_eq!(entry.subtitle, "");
        assert_eq!(entry.data, "");
    }

    #[test]
    fn missing_or_null_id_decodes_as_empty() {
        let entry: Entry = serde_json::from_str(r#"{"title":"A","trigger":"a"}"#).unwrap();
        assert!(entry.id.is_empty());
        let entry: Entry = serde_json::from_str(r#"{"id":null,"title":"A"}"#).unwrap();
        assert!(entry.id.is_empty());
    }

    #[test]
    fn new_entries_get_distinct_ids() {
        let a = Entry::new(EntryDraft::new("a", "A"));
        let b = Entry::new(EntryDraft::new("a", "A"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn apply_keeps_id() {
        let mut entry = Entry::with_id("42", EntryDraft::new("old", "Old"));
        entry.apply(EntryDraft::new("new", "New").data("payload"));
        assert_eq!(entry.id, "42");
        assert_eq!(entry.trigger, "new");
        assert_eq!(entry.data, "payload");
    }

    #[test]
    fn deserialize_accepts_numeric_id_and_missing_optional_fields() {
        let entry: Entry =
            serde_json::from_str(r#"{"id": 1700000000000, "title": "T", "trigger": "t"}"#)
                .unwrap();
        assert_eq!(entry.id, "1700000000000");
        assert_eq!(entry.subtitle, "");
        assert_eq!(entry.data, "");
    }
}
