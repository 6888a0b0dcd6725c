//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide launcher session.
//! - Translate host side effects into commands the Dart host executes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - All store and session calls go through one `Launcher`, so management
//!   edits are visible to the next search without reloading.

use log::warn;
use once_cell::sync::Lazy;
use snipdeck_core::kv::SqliteKeyValueStore;
use snipdeck_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, search_entries,
    ActivationEvent, Candidate, EntryDraft, HostCommand, ItemStore, KeyEvent, Launcher,
    LauncherConfig, MatchQuery, QueuedHost, Screen, SelectionState,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

const SEARCH_DEFAULT_LIMIT: u32 = 10;
const SEARCH_LIMIT_MAX: u32 = 50;
const IN_MEMORY_DB: &str = ":memory:";

type FfiLauncher = Launcher<SqliteKeyValueStore, QueuedHost>;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static LAUNCHER: Lazy<Mutex<Option<FfiLauncher>>> = Lazy::new(|| Mutex::new(None));

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file for this process.
///
/// Must run before the first store call to take effect. Calling again with
/// the same path is accepted; a different path is rejected. `:memory:`
/// keeps the store in RAM for the life of the process.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(db_path: String) -> String {
    let requested = PathBuf::from(db_path.trim());
    if requested.as_os_str().is_empty() {
        return "db_path must not be empty".to_string();
    }
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "store already bound to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// Snippet row shown in lists and search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetItem {
    pub id: String,
    pub trigger: String,
    pub title: String,
    pub subtitle: String,
    pub data: String,
}

/// Envelope for list/search calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetListResponse {
    pub ok: bool,
    pub items: Vec<SnippetItem>,
    pub message: String,
}

impl SnippetListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetActionResponse {
    pub ok: bool,
    /// Affected entry id, when one exists.
    pub id: Option<String>,
    pub message: String,
}

impl SnippetActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Side effect the Dart host must run, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAction {
    /// `copy_text|hide_window|exit_plugin`.
    pub kind: String,
    /// Clipboard text for `copy_text`.
    pub text: Option<String>,
}

/// Search screen state after one launcher call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherView {
    /// `neutral|manage|search`.
    pub screen: String,
    /// `idle|browsing|committed|cancelled`.
    pub state: String,
    pub query: String,
    pub items: Vec<SnippetItem>,
    pub selected_index: u32,
    /// Milliseconds until `launcher_tick` should be called for auto-commit.
    pub auto_commit_in_ms: Option<u32>,
    pub actions: Vec<HostAction>,
    /// Empty on success.
    pub error: String,
}

/// Lists every snippet in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_list() -> SnippetListResponse {
    match with_launcher(|launcher| {
        Ok(launcher
            .store()
            .entries()
            .iter()
            .map(to_item)
            .collect::<Vec<_>>())
    }) {
        Ok(items) => SnippetListResponse {
            ok: true,
            message: format!("{} snippet(s).", items.len()),
            items,
        },
        Err(err) => SnippetListResponse::failure(format!("snippet_list failed: {err}")),
    }
}

/// Ranked search with a normalized result cap.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_search(text: String, limit: Option<u32>) -> SnippetListResponse {
    let applied_limit = normalize_search_limit(limit);
    let query = MatchQuery::new(text).limit(applied_limit as usize);
    match with_launcher(|launcher| {
        Ok(search_entries(launcher.store().entries(), &query)
            .iter()
            .map(|candidate| to_item(&candidate.entry))
            .collect::<Vec<_>>())
    }) {
        Ok(items) => SnippetListResponse {
            ok: true,
            message: if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            },
            items,
        },
        Err(err) => SnippetListResponse::failure(format!("snippet_search failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn snippet_add(
    trigger: String,
    title: String,
    subtitle: String,
    data: String,
) -> SnippetActionResponse {
    let draft = EntryDraft::new(trigger, title).subtitle(subtitle).data(data);
    match with_launcher(|launcher| launcher.store_mut().add(draft).map_err(|err| err.to_string()))
    {
        Ok(entry) => SnippetActionResponse::success("Snippet created.", Some(entry.id)),
        Err(err) => SnippetActionResponse::failure(format!("snippet_add failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn snippet_update(
    id: String,
    trigger: String,
    title: String,
    subtitle: String,
    data: String,
) -> SnippetActionResponse {
    let draft = EntryDraft::new(trigger, title).subtitle(subtitle).data(data);
    match with_launcher(|launcher| {
        launcher
            .store_mut()
            .update(&id, draft)
            .map_err(|err| err.to_string())
    }) {
        Ok(entry) => SnippetActionResponse::success("Snippet updated.", Some(entry.id)),
        Err(err) => SnippetActionResponse::failure(format!("snippet_update failed: {err}")),
    }
}

/// Removes a snippet. Unknown ids succeed without change.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_remove(id: String) -> SnippetActionResponse {
    match with_launcher(|launcher| {
        launcher
            .store_mut()
            .remove(&id)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => SnippetActionResponse::success("Snippet removed.", Some(id)),
        Err(err) => SnippetActionResponse::failure(format!("snippet_remove failed: {err}")),
    }
}

/// Deletes every snippet. The Dart side confirms with the user first.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_clear() -> SnippetActionResponse {
    match with_launcher(|launcher| launcher.store_mut().clear().map_err(|err| err.to_string())) {
        Ok(()) => SnippetActionResponse::success("All snippets removed.", None),
        Err(err) => SnippetActionResponse::failure(format!("snippet_clear failed: {err}")),
    }
}

/// Returns the pretty-printed snapshot JSON, or an error message prefixed
/// with `error:`.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_export() -> String {
    match with_launcher(|launcher| {
        launcher
            .store()
            .export_snapshot()
            .to_json_pretty()
            .map_err(|err| err.to_string())
    }) {
        Ok(json) => json,
        Err(err) => format!("error: snippet_export failed: {err}"),
    }
}

/// Replaces every snippet with the imported payload.
///
/// The Dart side must confirm with the user first; there is no undo.
#[flutter_rust_bridge::frb(sync)]
pub fn snippet_import(raw: String) -> SnippetActionResponse {
    match with_launcher(|launcher| {
        launcher
            .store_mut()
            .import_raw(&raw)
            .map_err(|err| err.to_string())
    }) {
        Ok(count) => SnippetActionResponse::success(format!("Imported {count} snippet(s)."), None),
        Err(err) => SnippetActionResponse::failure(format!("snippet_import failed: {err}")),
    }
}

/// Host enter event.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_enter(code: String, payload: String) -> LauncherView {
    launcher_call(|launcher| {
        launcher.enter(&ActivationEvent::new(code, payload), Instant::now());
        Ok(())
    })
}

/// Host exit event.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_exit() -> LauncherView {
    launcher_call(|launcher| {
        launcher.exit();
        Ok(())
    })
}

/// Typed query change.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_query(text: String) -> LauncherView {
    launcher_call(|launcher| {
        launcher.set_query(&text);
        Ok(())
    })
}

/// Key press: `ArrowUp|ArrowDown|Enter|Escape`. Other keys are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_key(key: String) -> LauncherView {
    let Some(key) = parse_key(&key) else {
        return launcher_call(|_| Ok(()));
    };
    launcher_call(|launcher| {
        launcher
            .handle_key(key)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

/// Click on candidate row `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_click(index: u32) -> LauncherView {
    launcher_call(|launcher| {
        launcher
            .click(index as usize)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

/// Timer callback scheduled from `auto_commit_in_ms`.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_tick() -> LauncherView {
    launcher_call(|launcher| {
        launcher
            .tick(Instant::now())
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

fn launcher_call(f: impl FnOnce(&mut FfiLauncher) -> Result<(), String>) -> LauncherView {
    let result = with_launcher(|launcher| {
        let error = f(launcher).err().unwrap_or_default();
        Ok(render_view(launcher, error))
    });
    result.unwrap_or_else(|err| LauncherView {
        screen: screen_label(Screen::Neutral).to_string(),
        state: state_label(SelectionState::Idle).to_string(),
        query: String::new(),
        items: Vec::new(),
        selected_index: 0,
        auto_commit_in_ms: None,
        actions: Vec::new(),
        error: err,
    })
}

fn render_view(launcher: &mut FfiLauncher, error: String) -> LauncherView {
    let (query, selected_index, auto_commit_in_ms) = match launcher.search() {
        Some(session) => (
            session.query().to_string(),
            session.controller().selected_index() as u32,
            session.controller().auto_commit_deadline().map(|deadline| {
                deadline
                    .saturating_duration_since(Instant::now())
                    .as_millis()
                    .min(u128::from(u32::MAX)) as u32
            }),
        ),
        None => (String::new(), 0, None),
    };

    LauncherView {
        screen: screen_label(launcher.screen()).to_string(),
        state: state_label(launcher.selection_state()).to_string(),
        query,
        items: launcher
            .candidates()
            .iter()
            .map(|candidate: &Candidate| to_item(&candidate.entry))
            .collect(),
        selected_index,
        auto_commit_in_ms,
        actions: launcher
            .host_mut()
            .drain()
            .into_iter()
            .map(to_host_action)
            .collect(),
        error,
    }
}

fn with_launcher<T>(f: impl FnOnce(&mut FfiLauncher) -> Result<T, String>) -> Result<T, String> {
    let mut guard = LAUNCHER
        .lock()
        .map_err(|_| "launcher state poisoned by an earlier panic".to_string())?;
    if guard.is_none() {
        *guard = Some(build_launcher()?);
    }
    match guard.as_mut() {
        Some(launcher) => f(launcher),
        None => Err("launcher unavailable".to_string()),
    }
}

fn build_launcher() -> Result<FfiLauncher, String> {
    let config = LauncherConfig::load_default().unwrap_or_else(|err| {
        warn!("event=config_load module=ffi status=error fallback=defaults error={err}");
        LauncherConfig::default()
    });
    let db_path = DB_PATH.get_or_init(|| config.resolve_db_path()).clone();
    let kv = if db_path.as_os_str() == IN_MEMORY_DB {
        SqliteKeyValueStore::open_in_memory()
    } else {
        SqliteKeyValueStore::open(&db_path)
    }
    .map_err(|err| format!("snippet DB open failed: {err}"))?;
    let store = ItemStore::open_with_key(kv, config.storage_key.clone())
        .map_err(|err| format!("snippet store load failed: {err}"))?;
    Ok(Launcher::new(store, QueuedHost::new(), &config))
}

fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SEARCH_DEFAULT_LIMIT,
        Some(value) => value.min(SEARCH_LIMIT_MAX),
    }
}

fn parse_key(raw: &str) -> Option<KeyEvent> {
    match raw {
        "ArrowUp" => Some(KeyEvent::ArrowUp),
        "ArrowDown" => Some(KeyEvent::ArrowDown),
        "Enter" => Some(KeyEvent::Enter),
        "Escape" => Some(KeyEvent::Escape),
        _ => None,
    }
}

fn to_item(entry: &snipdeck_core::Entry) -> SnippetItem {
    SnippetItem {
        id: entry.id.clone(),
        trigger: entry.trigger.clone(),
        title: entry.title.clone(),
        subtitle: entry.subtitle.clone(),
        data: entry.data.clone(),
    }
}

fn to_host_action(command: HostCommand) -> HostAction {
    match command {
        HostCommand::CopyText(text) => HostAction {
            kind: "copy_text".to_string(),
            text: Some(text),
        },
        HostCommand::HideWindow => HostAction {
            kind: "hide_window".to_string(),
            text: None,
        },
        HostCommand::ExitPlugin => HostAction {
            kind: "exit_plugin".to_string(),
            text: None,
        },
    }
}

fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Neutral => "neutral",
        Screen::Manage => "manage",
        Screen::Search => "search",
    }
}

fn state_label(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Idle => "idle",
        SelectionState::Browsing => "browsing",
        SelectionState::Committed => "committed",
        SelectionState::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, init_store, launcher_enter, launcher_exit, launcher_key,
        launcher_query, normalize_search_limit, snippet_add, snippet_clear, snippet_export,
        snippet_import, snippet_list, snippet_remove, snippet_search, snippet_update, DB_PATH,
        IN_MEMORY_DB,
    };
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Launcher tests share one global session; run them one at a time.
    static SESSION_LOCK: Mutex<()> = Mutex::new(());

    fn setup() -> std::sync::MutexGuard<'static, ()> {
        let guard = SESSION_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let error = init_store(IN_MEMORY_DB.to_string());
        assert!(error.is_empty(), "{error}");
        guard
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}{nanos}")
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_arguments() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn search_limit_is_normalized() {
        assert_eq!(normalize_search_limit(None), 10);
        assert_eq!(normalize_search_limit(Some(0)), 10);
        assert_eq!(normalize_search_limit(Some(500)), 50);
        assert_eq!(normalize_search_limit(Some(3)), 3);
    }

    #[test]
    fn add_update_search_remove_cycle() {
        let _guard = setup();
        let trigger = unique_token("t");

        let created = snippet_add(
            trigger.clone(),
            "Title".to_string(),
            String::new(),
            "payload".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.id.expect("created id");

        let hits = snippet_search(trigger.clone(), None);
        assert_eq!(hits.items.first().map(|item| item.id.as_str()), Some(id.as_str()));

        let updated = snippet_update(
            id.clone(),
            trigger.clone(),
            "Renamed".to_string(),
            "sub".to_string(),
            "payload2".to_string(),
        );
        assert!(updated.ok, "{}", updated.message);

        assert!(snippet_remove(id.clone()).ok);
        assert!(snippet_remove(id.clone()).ok);
        assert!(!snippet_list().items.iter().any(|item| item.id == id));
    }

    #[test]
    fn add_rejects_blank_trigger() {
        let _guard = setup();
        let response = snippet_add(
            "  ".to_string(),
            "Title".to_string(),
            String::new(),
            String::new(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("trigger"));
    }

    #[test]
    fn import_rejects_unknown_shape_and_export_is_json() {
        let _guard = setup();
        let response = snippet_import(r#"{"items": []}"#.to_string());
        assert!(!response.ok);
        assert!(snippet_export().contains("\"version\": \"1.0\""));
    }

    #[test]
    fn enter_key_commit_emits_host_actions_in_order() {
        let _guard = setup();
        let trigger = unique_token("k");
        assert!(snippet_add(trigger.clone(), "T".to_string(), String::new(), "clip".to_string()).ok);

        let view = launcher_enter("snipdeck-search".to_string(), String::new());
        assert_eq!(view.screen, "search");
        assert_eq!(view.state, "idle");

        let view = launcher_query(trigger.clone());
        assert_eq!(view.items.len(), 1);

        let view = launcher_key("Enter".to_string());
        let kinds = view
            .actions
            .iter()
            .map(|action| action.kind.as_str())
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["copy_text", "hide_window", "exit_plugin"]);
        assert_eq!(view.actions[0].text.as_deref(), Some("clip"));

        let view = launcher_exit();
        assert_eq!(view.screen, "neutral");
    }

    #[test]
    fn seeded_exact_query_reports_auto_commit_delay() {
        let _guard = setup();
        let trigger = unique_token("s");
        assert!(snippet_add(trigger.clone(), "T".to_string(), String::new(), "x".to_string()).ok);

        let view = launcher_enter("snipdeck-search".to_string(), format!("sn {trigger}"));
        assert_eq!(view.query, trigger);
        assert!(view.auto_commit_in_ms.is_some_and(|ms| ms <= 100));

        let view = launcher_exit();
        assert!(view.actions.is_empty());
        assert_eq!(view.auto_commit_in_ms, None);
    }

    #[test]
    fn in_memory_store_leaves_no_file_behind() {
        let _guard = setup();
        assert!(snippet_add(unique_token("m"), "M".to_string(), String::new(), String::new()).ok);

        assert_eq!(
            DB_PATH.get().map(|path| path.as_os_str()),
            Some(std::ffi::OsStr::new(IN_MEMORY_DB))
        );
        assert!(!std::path::Path::new(IN_MEMORY_DB).exists());
    }

    #[test]
    fn clear_removes_every_snippet() {
        let _guard = setup();
        assert!(snippet_add(unique_token("c"), "C".to_string(), String::new(), String::new()).ok);
        assert!(!snippet_list().items.is_empty());

        let response = snippet_clear();
        assert!(response.ok, "{}", response.message);
        assert!(snippet_list().items.is_empty());
        assert!(snippet_search("c".to_string(), None).items.is_empty());
    }
}
