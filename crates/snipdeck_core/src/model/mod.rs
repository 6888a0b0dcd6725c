//! Domain model for launcher entries.
//!
//! # Responsibility
//! - Define the entry record shared by store, matching and codec layers.
//! - Keep field validation next to the data it guards.
//!
//! # Invariants
//! - Every entry is identified by an opaque, immutable `EntryId`.
//! - `title` and `trigger` are non-blank whenever an entry is committed
//!   through the store.

pub mod entry;
