//! Case-insensitive substring matcher with trigger-aware ranking.
//!
//! # Invariants
//! - An empty query yields no candidates (no "show all" fallback).
//! - Exact trigger matches rank first, trigger prefixes second, everything
//!   else keeps collection order. The sort is stable, so equal ranks never
//!   swap relative position.

use crate::model::entry::Entry;

/// Match tier of one candidate. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    /// `trigger` equals the query.
    ExactTrigger,
    /// `trigger` starts with the query.
    TriggerPrefix,
    /// Query found somewhere in trigger, title or subtitle.
    Contains,
}

/// Entry that satisfies the match predicate for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: Entry,
    pub rank: MatchRank,
}

/// Match options.
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
    pub text: String,
    /// Caps the result after ranking. `None` keeps every candidate.
    pub limit: Option<usize>,
}

impl MatchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ranks `entries` against `query` with no result cap.
pub fn match_entries(entries: &[Entry], query: &str) -> Vec<Candidate> {
    search_entries(entries, &MatchQuery::new(query))
}

/// Ranks `entries` against `query.text`, then applies `query.limit`.
pub fn search_entries(entries: &[Entry], query: &MatchQuery) -> Vec<Candidate> {
    if query.text.is_empty() {
        return Vec::new();
    }

    let needle = query.text.to_lowercase();
    let mut candidates = entries
        .iter()
        .filter_map(|entry| {
            classify(entry, &needle).map(|rank| Candidate {
                entry: entry.clone(),
                rank,
            })
        })
        .collect::<Vec<_>>();

    // `sort_by_key` is stable.
    candidates.sort_by_key(|candidate| candidate.rank);

    if let Some(limit) = query.limit {
        candidates.truncate(limit);
    }
    candidates
}

/// Returns whether `trigger` equals `query` ignoring case.
pub fn trigger_equals(trigger: &str, query: &str) -> bool {
    trigger.to_lowercase() == query.to_lowercase()
}

fn classify(entry: &Entry, needle: &str) -> Option<MatchRank> {
    let trigger = entry.trigger.to_lowercase();
    if trigger == needle {
        return Some(MatchRank::ExactTrigger);
    }
    if trigger.starts_with(needle) {
        return Some(MatchRank::TriggerPrefix);
    }

    let hit = trigger.contains(needle)
        || entry.title.to_lowercase().contains(needle)
        || entry.subtitle.to_lowercase().contains(needle);
    hit.then_some(MatchRank::Contains)
}
