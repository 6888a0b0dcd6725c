//! Persistent entry store.
//!
//! # Responsibility
//! - Own the durable collection and expose load/replace/add/update/remove.
//! - Translate storage and codec failures into semantic store errors.
//!
//! # Invariants
//! - Every mutation persists the whole collection before the in-memory
//!   copy changes; a failed write leaves both untouched.
//! - Corrupt persisted data is an error, never an empty collection.

pub mod item_store;
