//! Launcher configuration.
//!
//! # Responsibility
//! - Load launcher settings from TOML with defaults for every field.
//! - Resolve the database location from env, file, then platform dirs.
//!
//! # Invariants
//! - Launcher keywords are two or three ASCII letters.
//! - Search and management activation codes never overlap.

use crate::repo::item_store::DEFAULT_STORAGE_KEY;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SNIPDECK_CONFIG";
/// Overrides the database file location.
pub const DB_PATH_ENV: &str = "SNIPDECK_DB_PATH";

const APP_DIR_NAME: &str = "snipdeck";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "snipdeck.sqlite3";

static KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}$").expect("valid keyword regex"));

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidKeyword(String),
    OverlappingCode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidKeyword(value) => {
                write!(f, "launcher keyword must be 2-3 letters, got `{value}`")
            }
            Self::OverlappingCode(value) => {
                write!(f, "activation code `{value}` is both a search and a manage code")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidKeyword(_) | Self::OverlappingCode(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Activation codes that open the search screen.
    pub search_codes: Vec<String>,
    /// Activation codes that open the management screen.
    pub manage_codes: Vec<String>,
    /// Keywords stripped from `<keyword> <text>` activation payloads.
    pub launcher_keywords: Vec<String>,
    /// Settle delay before auto-commit, in milliseconds.
    pub settle_delay_ms: u64,
    /// Key the collection blob is stored under.
    pub storage_key: String,
    /// Explicit database file. Falls back to the platform data dir.
    pub db_path: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            search_codes: vec!["snipdeck-search".to_string()],
            manage_codes: vec!["snipdeck-manage".to_string()],
            launcher_keywords: vec!["sn".to_string(), "snp".to_string()],
            settle_delay_ms: 100,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: None,
        }
    }
}

impl LauncherConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<Self>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `$SNIPDECK_CONFIG`, else the per-user config file, else defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = env_path(CONFIG_PATH_ENV) {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self
            .launcher_keywords
            .iter()
            .find(|keyword| !KEYWORD_RE.is_match(keyword))
        {
            return Err(ConfigError::InvalidKeyword(bad.clone()));
        }
        if let Some(code) = self
            .search_codes
            .iter()
            .find(|code| self.manage_codes.contains(code))
        {
            return Err(ConfigError::OverlappingCode(code.clone()));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Database file: `$SNIPDECK_DB_PATH`, then `db_path`, then the platform
    /// data dir, then the temp dir.
    pub fn resolve_db_path(&self) -> PathBuf {
        if let Some(path) = env_path(DB_PATH_ENV) {
            return path;
        }
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(std::env::temp_dir)
            .join(DB_FILE_NAME)
    }
}

/// Per-user config file location, e.g. `~/.config/snipdeck/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}
