//! Trigger matching and ranking.
//!
//! # Responsibility
//! - Turn a partial keystroke into an ordered candidate list.
//! - Stay a pure function of (collection, query); no caching, no state.

pub mod matcher;
