use snipdeck_core::{match_entries, Entry, EntryDraft, MatchRank, SelectionController, SelectionState};

fn entry(id: &str, trigger: &str) -> Entry {
    Entry::with_id(id, EntryDraft::new(trigger, format!("{trigger} title")))
}

#[test]
fn exact_trigger_ranks_before_prefix() {
    let entries = vec![entry("1", "email"), entry("2", "em")];
    let candidates = match_entries(&entries, "em");

    let triggers = candidates
        .iter()
        .map(|candidate| candidate.entry.trigger.as_str())
        .collect::<Vec<_>>();
    assert_eq!(triggers, vec!["em", "email"]);
}

#[test]
fn trigger_infix_is_a_candidate() {
    let entries = vec![entry("1", "gitlink")];
    let candidates = match_entries(&entries, "link");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].entry.id, "1");
}

#[test]
fn empty_collection_stays_idle() {
    let candidates = match_entries(&[], "anything");
    assert!(candidates.is_empty());

    let mut controller = SelectionController::default();
    controller.set_candidates(candidates);
    assert_eq!(controller.state(), SelectionState::Idle);
    assert_eq!(controller.selected_index(), 0);
}

#[test]
fn empty_query_is_always_empty() {
    let entries = (0..10)
        .map(|i| entry(&i.to_string(), &format!("t{i}")))
        .collect::<Vec<_>>();
    assert!(match_entries(&entries, "").is_empty());
}

#[test]
fn exact_matches_precede_every_other_match() {
    let triggers = ["xpw", "pw-home", "PW", "passwords", "pw", "mypw", "Pw"];
    let entries = triggers
        .iter()
        .enumerate()
        .map(|(i, trigger)| entry(&i.to_string(), trigger))
        .collect::<Vec<_>>();

    let candidates = match_entries(&entries, "pw");
    let first_non_exact = candidates
        .iter()
        .position(|candidate| candidate.rank != MatchRank::ExactTrigger)
        .expect("there are non-exact matches");
    assert_eq!(first_non_exact, 3);
    assert!(candidates[first_non_exact..]
        .iter()
        .all(|candidate| candidate.rank != MatchRank::ExactTrigger));

    let ids = candidates
        .iter()
        .map(|candidate| candidate.entry.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["2", "4", "6", "1", "0", "5"]);
}

#[test]
fn index_stays_in_bounds_for_any_key_sequence() {
    let entries = vec![entry("1", "ab"), entry("2", "abc"), entry("3", "abcd")];
    let mut controller = SelectionController::default();
    controller.set_candidates(match_entries(&entries, "ab"));

    let pattern = [true, true, true, true, false, true, false, false, false, false, true];
    for down in pattern {
        if down {
            controller.move_down();
        } else {
            controller.move_up();
        }
        assert!(controller.selected_index() < controller.candidates().len());
    }

    controller.set_candidates(match_entries(&entries, "zzz"));
    assert_eq!(controller.selected_index(), 0);
}
