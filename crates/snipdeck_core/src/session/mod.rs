//! Interactive search session.
//!
//! # Responsibility
//! - Route host activation events to the management or search screen.
//! - Drive the keyboard selection state machine over match results.
//! - Hand committed payloads to the host bridge.
//!
//! # Invariants
//! - Single-threaded: every call arrives on the UI event loop.
//! - Scoped resources (keyboard subscription, settle timer) never outlive
//!   the search session that owns them.

pub mod activation;
pub mod host;
pub mod launcher;
pub mod selection;
