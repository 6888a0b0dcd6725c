//! Launcher session: wires store, matcher, selection and host together.
//!
//! # Responsibility
//! - React to host enter/exit events by opening the right screen.
//! - Re-run matching on every query change and feed the controller.
//! - Deliver committed payloads to the host in copy -> hide -> exit order.
//!
//! # Invariants
//! - The keyboard subscription and settle timer live inside `SearchSession`
//!   and are released when it drops, on every exit path.
//! - No commit can fire after `exit()` or after a new `enter()`.

use crate::config::LauncherConfig;
use crate::kv::KeyValueStore;
use crate::model::entry::Entry;
use crate::repo::item_store::ItemStore;
use crate::search::matcher::{match_entries, Candidate};
use crate::session::activation::{ActivationEvent, ActivationRouter, Screen};
use crate::session::host::{HostBridge, HostError};
use crate::session::selection::{
    KeyEvent, SelectionController, SelectionOutcome, SelectionState,
};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Search-view state scoped to one activation.
pub struct SearchSession {
    query: String,
    controller: SelectionController,
}

impl SearchSession {
    fn start(settle_delay: Duration) -> Self {
        debug!("event=keyboard_attach module=session status=ok");
        Self {
            query: String::new(),
            controller: SelectionController::new(settle_delay),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        let pending = self.controller.auto_commit_deadline().is_some();
        debug!("event=keyboard_release module=session status=ok auto_commit_cancelled={pending}");
    }
}

/// Interactive launcher over one item store and one host.
pub struct Launcher<S: KeyValueStore, H: HostBridge> {
    store: ItemStore<S>,
    host: H,
    router: ActivationRouter,
    settle_delay: Duration,
    screen: Screen,
    search: Option<SearchSession>,
}

impl<S: KeyValueStore, H: HostBridge> Launcher<S, H> {
    pub fn new(store: ItemStore<S>, host: H, config: &LauncherConfig) -> Self {
        Self {
            store,
            host,
            router: ActivationRouter::new(config),
            settle_delay: config.settle_delay(),
            screen: Screen::Neutral,
            search: None,
        }
    }

    /// Host enter event. Replaces any previous session.
    ///
    /// On the search screen the payload is reduced to a query and seeded,
    /// which may arm the auto-commit timer relative to `now`.
    pub fn enter(&mut self, event: &ActivationEvent, now: Instant) -> Screen {
        self.search = None;
        self.screen = self.router.screen_for(&event.code);
        info!(
            "event=launcher_enter module=session status=ok screen={:?} entry_count={}",
            self.screen,
            self.store.len()
        );

        if self.screen == Screen::Search {
            let mut session = SearchSession::start(self.settle_delay);
            session.query = self.router.extract_query(&event.payload).to_string();
            let candidates = match_entries(self.store.entries(), &session.query);
            let armed = session.controller.seed(&session.query, candidates, now);
            if armed {
                debug!("event=auto_commit_armed module=session status=ok");
            }
            self.search = Some(session);
        }
        self.screen
    }

    /// Host exit event. Resets to neutral and drops the search session.
    pub fn exit(&mut self) {
        self.search = None;
        self.screen = Screen::Neutral;
        info!("event=launcher_exit module=session status=ok");
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn search(&self) -> Option<&SearchSession> {
        self.search.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        match &self.search {
            Some(session) => session.controller.candidates(),
            None => &[],
        }
    }

    pub fn store(&self) -> &ItemStore<S> {
        &self.store
    }

    /// Management surface. Open search sessions are refreshed on next query.
    pub fn store_mut(&mut self) -> &mut ItemStore<S> {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Typed query change. Ignored outside the search screen.
    pub fn set_query(&mut self, text: &str) {
        let Some(session) = self.search.as_mut() else {
            return;
        };
        session.query = text.to_string();
        let candidates = match_entries(self.store.entries(), &session.query);
        session.controller.set_candidates(candidates);
    }

    /// Keyboard input while the search view is active.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<SelectionOutcome, HostError> {
        let Some(session) = self.search.as_mut() else {
            return Ok(SelectionOutcome::Ignored);
        };
        let outcome = session.controller.handle_key(key);
        if let SelectionOutcome::Committed(entry) = &outcome {
            self.deliver(entry)?;
        }
        Ok(outcome)
    }

    /// Pointer click on candidate row `index`.
    pub fn click(&mut self, index: usize) -> Result<Option<Entry>, HostError> {
        let Some(session) = self.search.as_mut() else {
            return Ok(None);
        };
        let committed = session.controller.commit_at(index);
        if let Some(entry) = &committed {
            self.deliver(entry)?;
        }
        Ok(committed)
    }

    /// Event-loop tick. Fires a due auto-commit.
    pub fn tick(&mut self, now: Instant) -> Result<Option<Entry>, HostError> {
        let Some(session) = self.search.as_mut() else {
            return Ok(None);
        };
        let committed = session.controller.poll_auto_commit(now);
        if let Some(entry) = &committed {
            info!("event=auto_commit module=session status=ok");
            self.deliver(entry)?;
        }
        Ok(committed)
    }

    pub fn selection_state(&self) -> SelectionState {
        self.search
            .as_ref()
            .map_or(SelectionState::Idle, |session| session.controller.state())
    }

    fn deliver(&mut self, entry: &Entry) -> Result<(), HostError> {
        self.host.copy_text(&entry.data)?;
        self.host.hide_window();
        self.host.exit_plugin();
        info!(
            "event=commit module=session status=ok payload_len={}",
            entry.data.len()
        );
        Ok(())
    }
}
