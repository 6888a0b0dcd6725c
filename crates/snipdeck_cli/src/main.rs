//! Terminal front end for SnipDeck.
//!
//! # Responsibility
//! - Manage entries (add/edit/remove/list/clear) from the shell.
//! - Back up and restore the collection as snapshot files.
//! - Resolve a trigger to its payload through the same launcher session
//!   the GUI host uses, printing the payload instead of copying it.

use clap::{Parser, Subcommand};
use snipdeck_core::kv::SqliteKeyValueStore;
use snipdeck_core::{
    init_logging, search_entries, snapshot_file_name, ActivationEvent, EntryDraft, HostBridge,
    HostError, ItemStore, Launcher, LauncherConfig, MatchQuery, SelectionState,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "snipdeck", version, about = "Trigger-word snippet launcher")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = "SNIPDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Database file; overrides the config
    #[arg(long, global = true, env = "SNIPDECK_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List entries in insertion order
    List,
    /// Add an entry
    Add {
        trigger: String,
        title: String,
        #[arg(long, default_value = "")]
        subtitle: String,
        /// Payload; `-` reads stdin
        #[arg(long, default_value = "")]
        data: String,
    },
    /// Replace every field of an existing entry
    Edit {
        id: String,
        trigger: String,
        title: String,
        #[arg(long, default_value = "")]
        subtitle: String,
        #[arg(long, default_value = "")]
        data: String,
    },
    /// Remove an entry (unknown ids are ignored)
    Remove { id: String },
    /// Remove every entry
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Show ranked matches for a query
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the payload for a query, as the launcher would commit it
    Pick {
        /// Activation payload, e.g. `sn email` or `email`
        payload: String,
        /// Candidate row to commit when several match
        #[arg(long)]
        index: Option<usize>,
    },
    /// Write a snapshot file
    Export {
        /// Output file; defaults to a dated name in the current directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the whole collection with a snapshot file
    Import {
        file: PathBuf,
        /// Confirm the destructive replace
        #[arg(long)]
        yes: bool,
    },
}

/// Host that prints the committed payload to stdout.
struct StdoutHost;

impl HostBridge for StdoutHost {
    fn copy_text(&mut self, text: &str) -> Result<(), HostError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| HostError::Clipboard(err.to_string()))
    }

    fn hide_window(&mut self) {}

    fn exit_plugin(&mut self) {}
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(snipdeck_core::default_log_level(), log_dir)?;
    }

    let mut config = match &cli.config {
        Some(path) => LauncherConfig::load(path)?,
        None => LauncherConfig::load_default()?,
    };
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    let kv = SqliteKeyValueStore::open(config.resolve_db_path())?;
    let mut store = ItemStore::open_with_key(kv, config.storage_key.clone())?;

    match cli.command {
        Command::List => {
            for entry in store.entries() {
                print_row(&entry.id, &entry.trigger, &entry.title, &entry.subtitle);
            }
        }
        Command::Add {
            trigger,
            title,
            subtitle,
            data,
        } => {
            let draft = EntryDraft::new(trigger, title)
                .subtitle(subtitle)
                .data(read_payload(data)?);
            let entry = store.add(draft)?;
            println!("{}", entry.id);
        }
        Command::Edit {
            id,
            trigger,
            title,
            subtitle,
            data,
        } => {
            let draft = EntryDraft::new(trigger, title)
                .subtitle(subtitle)
                .data(read_payload(data)?);
            store.update(&id, draft)?;
        }
        Command::Remove { id } => store.remove(&id)?,
        Command::Clear { yes } => {
            require_confirmation(yes, "clear")?;
            store.clear()?;
        }
        Command::Search { query, limit } => {
            let query = MatchQuery {
                text: query,
                limit,
            };
            for candidate in search_entries(store.entries(), &query) {
                let entry = &candidate.entry;
                print_row(&entry.id, &entry.trigger, &entry.title, &entry.subtitle);
            }
        }
        Command::Pick { payload, index } => pick(store, &config, &payload, index)?,
        Command::Export { out } => {
            let path = out.unwrap_or_else(|| {
                PathBuf::from(snapshot_file_name(chrono::Local::now().date_naive()))
            });
            std::fs::write(&path, store.export_snapshot().to_json_pretty()?)?;
            eprintln!("Exported {} entries to {}", store.len(), path.display());
        }
        Command::Import { file, yes } => {
            require_confirmation(yes, "import")?;
            let raw = std::fs::read_to_string(&file)?;
            let count = store.import_raw(&raw)?;
            eprintln!("Imported {count} entries from {}", file.display());
        }
    }
    Ok(())
}

/// Runs one search session: seeded payload, optional auto-commit wait,
/// then an explicit row commit when `index` is given.
fn pick(
    store: ItemStore<SqliteKeyValueStore>,
    config: &LauncherConfig,
    payload: &str,
    index: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut launcher = Launcher::new(store, StdoutHost, config);
    let search_code = config
        .search_codes
        .first()
        .cloned()
        .ok_or("config has no search code")?;
    launcher.enter(&ActivationEvent::new(search_code, payload), Instant::now());

    let deadline = launcher
        .search()
        .and_then(|session| session.controller().auto_commit_deadline());
    if let Some(deadline) = deadline {
        std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
        launcher.tick(Instant::now())?;
    } else if let Some(index) = index {
        launcher.click(index)?;
    }

    if launcher.selection_state() == SelectionState::Committed {
        return Ok(());
    }

    for (row, candidate) in launcher.candidates().iter().enumerate() {
        let entry = &candidate.entry;
        eprintln!("[{row}] {}\t{}", entry.trigger, entry.title);
    }
    launcher.exit();
    Err("no unique match; pass --index to choose a row".into())
}

fn read_payload(data: String) -> Result<String, std::io::Error> {
    if data != "-" {
        return Ok(data);
    }
    std::io::read_to_string(std::io::stdin())
}

fn require_confirmation(yes: bool, action: &str) -> Result<(), Box<dyn Error>> {
    if yes {
        return Ok(());
    }
    Err(format!("{action} replaces every entry and cannot be undone; rerun with --yes").into())
}

fn print_row(id: &str, trigger: &str, title: &str, subtitle: &str) {
    if subtitle.is_empty() {
        println!("{id}\t{trigger}\t{title}");
    } else {
        println!("{id}\t{trigger}\t{title} ({subtitle})");
    }
}
