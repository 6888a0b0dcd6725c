//! Flutter-facing bindings for SnipDeck core.

pub mod api;
