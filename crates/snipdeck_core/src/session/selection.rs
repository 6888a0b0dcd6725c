//! Keyboard-driven selection state machine over a candidate list.
//!
//! # Invariants
//! - While browsing, `selected_index` stays within `[0, len - 1]`.
//! - An empty candidate list forces `Idle` with index `0`.
//! - Movement clamps at both ends; there is no wraparound.
//! - A pending auto-commit is disarmed by any new candidate list, any key
//!   action, or drop of the controller.

use crate::model::entry::Entry;
use crate::search::matcher::{trigger_equals, Candidate};
use std::time::{Duration, Instant};

/// Default wait between seeding a query and firing its auto-commit.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No candidates.
    Idle,
    /// At least one candidate; index is in range.
    Browsing,
    /// A candidate was delivered. Terminal until a new candidate list arrives.
    Committed,
    /// The user backed out. Terminal until a new candidate list arrives.
    Cancelled,
}

/// Keys the search view listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// Result of feeding one action into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Action had no effect in the current state.
    Ignored,
    Moved { index: usize },
    Committed(Entry),
    Cancelled,
}

/// Pending auto-commit deadline.
///
/// The event loop polls it; dropping it is the cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    deadline: Instant,
}

impl SettleTimer {
    pub fn arm(now: Instant, delay: Duration) -> Self {
        Self {
            deadline: now + delay,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

pub struct SelectionController {
    candidates: Vec<Candidate>,
    selected_index: usize,
    state: SelectionState,
    settle_delay: Duration,
    auto_commit: Option<SettleTimer>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl SelectionController {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            candidates: Vec::new(),
            selected_index: 0,
            state: SelectionState::Idle,
            settle_delay,
            auto_commit: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.candidates.get(self.selected_index)
    }

    /// Deadline of the armed auto-commit, if any.
    pub fn auto_commit_deadline(&self) -> Option<Instant> {
        self.auto_commit.map(|timer| timer.deadline())
    }

    /// Installs a freshly computed candidate list (typed query path).
    ///
    /// Clamps the index into range and disarms any pending auto-commit.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.auto_commit = None;
        self.candidates = candidates;

        if self.candidates.is_empty() {
            self.selected_index = 0;
            self.state = SelectionState::Idle;
        } else {
            self.selected_index = self.selected_index.min(self.candidates.len() - 1);
            self.state = SelectionState::Browsing;
        }
    }

    /// Installs candidates for a query supplied by the caller rather than typed.
    ///
    /// Arms the settle timer when exactly one candidate exists and its trigger
    /// equals `query` ignoring case. Returns whether the timer was armed.
    pub fn seed(&mut self, query: &str, candidates: Vec<Candidate>, now: Instant) -> bool {
        self.set_candidates(candidates);

        let unique_exact = match self.candidates.as_slice() {
            [only] => !query.is_empty() && trigger_equals(&only.entry.trigger, query),
            _ => false,
        };
        if unique_exact {
            self.auto_commit = Some(SettleTimer::arm(now, self.settle_delay));
        }
        unique_exact
    }

    /// Fires the armed auto-commit once its deadline has passed.
    pub fn poll_auto_commit(&mut self, now: Instant) -> Option<Entry> {
        let timer = self.auto_commit?;
        if !timer.is_due(now) {
            return None;
        }
        self.auto_commit = None;
        self.commit()
    }

    pub fn move_down(&mut self) -> SelectionOutcome {
        if self.state != SelectionState::Browsing {
            return SelectionOutcome::Ignored;
        }
        self.auto_commit = None;
        self.selected_index = (self.selected_index + 1).min(self.candidates.len() - 1);
        SelectionOutcome::Moved {
            index: self.selected_index,
        }
    }

    pub fn move_up(&mut self) -> SelectionOutcome {
        if self.state != SelectionState::Browsing {
            return SelectionOutcome::Ignored;
        }
        self.auto_commit = None;
        self.selected_index = self.selected_index.saturating_sub(1);
        SelectionOutcome::Moved {
            index: self.selected_index,
        }
    }

    /// Commits the selected candidate.
    ///
    /// Returns `None` unless browsing with the index in range.
    pub fn commit(&mut self) -> Option<Entry> {
        if self.state != SelectionState::Browsing {
            return None;
        }
        let entry = self.candidates.get(self.selected_index)?.entry.clone();
        self.auto_commit = None;
        self.state = SelectionState::Committed;
        Some(entry)
    }

    /// Selects `index` and commits it (pointer click on a row).
    pub fn commit_at(&mut self, index: usize) -> Option<Entry> {
        if self.state != SelectionState::Browsing || index >= self.candidates.len() {
            return None;
        }
        self.selected_index = index;
        self.commit()
    }

    pub fn cancel(&mut self) -> SelectionOutcome {
        self.auto_commit = None;
        self.state = SelectionState::Cancelled;
        SelectionOutcome::Cancelled
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectionOutcome {
        match key {
            KeyEvent::ArrowDown => self.move_down(),
            KeyEvent::ArrowUp => self.move_up(),
            KeyEvent::Enter => match self.commit() {
                Some(entry) => SelectionOutcome::Committed(entry),
                None => SelectionOutcome::Ignored,
            },
            KeyEvent::Escape => self.cancel(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyEvent, SelectionController, SelectionOutcome, SelectionState};
    use crate::model::entry::{Entry, EntryDraft};
    use crate::search::matcher::match_entries;
    use std::time::{Duration, Instant};

    fn entries(triggers: &[&str]) -> Vec<Entry> {
        triggers
            .iter()
            .enumerate()
            .map(|(i, trigger)| {
                Entry::with_id(i.to_string(), EntryDraft::new(*trigger, *trigger).data(*trigger))
            })
            .collect()
    }

    #[test]
    fn empty_candidates_stay_idle() {
        let mut controller = SelectionController::default();
        controller.set_candidates(match_entries(&[], "abc"));
        assert_eq!(controller.state(), SelectionState::Idle);
        assert_eq!(controller.move_down(), SelectionOutcome::Ignored);
        assert_eq!(controller.handle_key(KeyEvent::Enter), SelectionOutcome::Ignored);
        assert_eq!(controller.selected_index(), 0);
    }

    #[test]
    fn movement_clamps_without_wraparound() {
        let list = entries(&["a1", "a2", "a3"]);
        let mut controller = SelectionController::default();
        controller.set_candidates(match_entries(&list, "a"));

        assert_eq!(controller.move_up(), SelectionOutcome::Moved { index: 0 });
        for _ in 0..5 {
            controller.move_down();
        }
        assert_eq!(controller.selected_index(), 2);
        controller.move_up();
        assert_eq!(controller.selected_index(), 1);
    }

    #[test]
    fn shrinking_list_clamps_and_empty_list_resets() {
        let list = entries(&["ab", "ac", "ad"]);
        let mut controller = SelectionController::default();
        controller.set_candidates(match_entries(&list, "a"));
        controller.move_down();
        controller.move_down();
        assert_eq!(controller.selected_index(), 2);

        controller.set_candidates(match_entries(&list, "ab"));
        assert_eq!(controller.selected_index(), 0);
        assert_eq!(controller.state(), SelectionState::Browsing);

        controller.set_candidates(Vec::new());
        assert_eq!(controller.selected_index(), 0);
        assert_eq!(controller.state(), SelectionState::Idle);
    }

    #[test]
    fn enter_commits_selected_candidate() {
        let list = entries(&["x1", "x2"]);
        let mut controller = SelectionController::default();
        controller.set_candidates(match_entries(&list, "x"));
        controller.handle_key(KeyEvent::ArrowDown);

        match controller.handle_key(KeyEvent::Enter) {
            SelectionOutcome::Committed(entry) => assert_eq!(entry.trigger, "x2"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(controller.state(), SelectionState::Committed);
        assert!(controller.commit().is_none());
    }

    #[test]
    fn click_selects_then_commits() {
        let list = entries(&["k1", "k2", "k3"]);
        let mut controller = SelectionController::default();
        controller.set_candidates(match_entries(&list, "k"));

        assert!(controller.commit_at(7).is_none());
        let entry = controller.commit_at(2).expect("row 2 exists");
        assert_eq!(entry.trigger, "k3");
        assert_eq!(controller.selected_index(), 2);
    }

    #[test]
    fn escape_cancels_even_when_idle() {
        let mut controller = SelectionController::default();
        assert_eq!(
            controller.handle_key(KeyEvent::Escape),
            SelectionOutcome::Cancelled
        );
        assert_eq!(controller.state(), SelectionState::Cancelled);
    }

    #[test]
    fn seed_arms_only_for_unique_exact_trigger() {
        let now = Instant::now();
        let list = entries(&["Sig", "sign"]);
        let mut controller = SelectionController::default();

        assert!(!controller.seed("sig", match_entries(&list, "sig"), now));
        assert!(controller.auto_commit_deadline().is_none());

        let only = entries(&["Sig"]);
        assert!(controller.seed("sig", match_entries(&only, "sig"), now));
        assert_eq!(
            controller.auto_commit_deadline(),
            Some(now + Duration::from_millis(100))
        );

        let prefix_only = entries(&["signature"]);
        assert!(!controller.seed("sig", match_entries(&prefix_only, "sig"), now));
    }

    #[test]
    fn auto_commit_fires_after_settle_delay() {
        let now = Instant::now();
        let list = entries(&["addr"]);
        let mut controller = SelectionController::default();
        controller.seed("addr", match_entries(&list, "addr"), now);

        assert!(controller
            .poll_auto_commit(now + Duration::from_millis(99))
            .is_none());
        let entry = controller
            .poll_auto_commit(now + Duration::from_millis(100))
            .expect("auto-commit should fire");
        assert_eq!(entry.data, "addr");
        assert!(controller
            .poll_auto_commit(now + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn new_candidates_disarm_auto_commit() {
        let now = Instant::now();
        let list = entries(&["addr"]);
        let mut controller = SelectionController::default();
        controller.seed("addr", match_entries(&list, "addr"), now);
        controller.set_candidates(match_entries(&list, "add"));

        assert!(controller
            .poll_auto_commit(now + Duration::from_secs(1))
            .is_none());
        assert_eq!(controller.state(), SelectionState::Browsing);
    }

    #[test]
    fn arrow_keys_disarm_auto_commit() {
        let now = Instant::now();
        let list = entries(&["addr"]);
        for key in [KeyEvent::ArrowDown, KeyEvent::ArrowUp] {
            let mut controller = SelectionController::default();
            assert!(controller.seed("addr", match_entries(&list, "addr"), now));

            assert_eq!(controller.handle_key(key), SelectionOutcome::Moved { index: 0 });
            assert_eq!(controller.auto_commit_deadline(), None);
            assert!(controller
                .poll_auto_commit(now + Duration::from_secs(1))
                .is_none());
            assert_eq!(controller.state(), SelectionState::Browsing);
        }
    }
}
