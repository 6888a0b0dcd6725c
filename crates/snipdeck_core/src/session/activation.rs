//! Activation routing: which screen to show and what to search for.

use crate::config::LauncherConfig;
use regex::Regex;

/// Event delivered by the host when the plugin window opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEvent {
    pub code: String,
    pub payload: String,
}

impl ActivationEvent {
    pub fn new(code: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            payload: payload.into(),
        }
    }
}

/// Screen the launcher presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Neutral,
    Manage,
    Search,
}

/// Routes activation codes and reduces payloads to an initial query.
#[derive(Debug, Clone)]
pub struct ActivationRouter {
    search_codes: Vec<String>,
    manage_codes: Vec<String>,
    keyword_query: Option<Regex>,
}

impl ActivationRouter {
    /// Builds the router. Keywords are escaped, so config validation is the
    /// only gate on their shape.
    pub fn new(config: &LauncherConfig) -> Self {
        let keyword_query = if config.launcher_keywords.is_empty() {
            None
        } else {
            let alternatives = config
                .launcher_keywords
                .iter()
                .map(|keyword| regex::escape(keyword))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"^(?:{alternatives})\s+(.+)$")).ok()
        };

        Self {
            search_codes: config.search_codes.clone(),
            manage_codes: config.manage_codes.clone(),
            keyword_query,
        }
    }

    /// Screen for `code`; unknown codes stay neutral.
    pub fn screen_for(&self, code: &str) -> Screen {
        if self.search_codes.iter().any(|known| known == code) {
            Screen::Search
        } else if self.manage_codes.iter().any(|known| known == code) {
            Screen::Manage
        } else {
            Screen::Neutral
        }
    }

    /// Reduces `<keyword> <free text>` to the free text; otherwise verbatim.
    pub fn extract_query<'a>(&self, payload: &'a str) -> &'a str {
        self.keyword_query
            .as_ref()
            .and_then(|re| re.captures(payload))
            .and_then(|captures| captures.get(1))
            .map_or(payload, |text| text.as_str())
    }
}
