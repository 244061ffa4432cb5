#![forbid(unsafe_code)]

//! Store and search configuration.
//!
//! Both configs start from [`Default`], can be adjusted with `with_*`
//! builders, and accept environment overrides through `from_env()`:
//!
//! | Variable                   | Effect                                  |
//! |----------------------------|-----------------------------------------|
//! | `RECSTATE_LABEL`           | default store label in log events       |
//! | `RECSTATE_LOG_TRANSITIONS` | `1`/`true` logs every store transition  |
//! | `RECSTATE_HISTORY_MODE`    | `push` or `replace`                     |
//! | `RECSTATE_ARRAY_FORMAT`    | `repeat` or `comma`                     |
//! | `RECSTATE_SKIP_NULLS`      | `0`/`false` keeps `null` query values   |

use std::env;

use serde::{Deserialize, Serialize};

fn env_flag(name: &str) -> Option<bool> {
    let val = env::var(name).ok()?;
    Some(val == "1" || val.eq_ignore_ascii_case("true"))
}

/// Configuration shared by record stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name attached to log events for this store. Default: `"record"`.
    pub label: String,
    /// Emit a debug event for every state transition. Default: false.
    pub log_transitions: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: "record".to_string(),
            log_transitions: false,
        }
    }
}

impl StoreConfig {
    /// Defaults overlaid with `RECSTATE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = env::var("RECSTATE_LABEL")
            && !val.is_empty()
        {
            config.label = val;
        }
        if let Some(flag) = env_flag("RECSTATE_LOG_TRANSITIONS") {
            config.log_transitions = flag;
        }
        config
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_log_transitions(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }
}

/// How a search update is written into navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Overwrite the current entry.
    #[default]
    Replace,
    /// Append a new entry.
    Push,
}

impl HistoryMode {
    fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "push" => Some(Self::Push),
            _ => None,
        }
    }
}

/// How array values are written into a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    /// `tag=a&tag=b`
    #[default]
    Repeat,
    /// `tag=a,b`
    Comma,
}

impl ArrayFormat {
    fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "repeat" => Some(Self::Repeat),
            "comma" => Some(Self::Comma),
            _ => None,
        }
    }
}

/// Configuration for query-string-synced records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub history_mode: HistoryMode,
    pub array_format: ArrayFormat,
    /// Drop `null` values instead of writing empty parameters. Default: true.
    pub skip_nulls: bool,
    pub store: StoreConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            history_mode: HistoryMode::Replace,
            array_format: ArrayFormat::Repeat,
            skip_nulls: true,
            store: StoreConfig::default().with_label("search"),
        }
    }
}

impl SearchConfig {
    /// Defaults overlaid with `RECSTATE_*` environment variables.
    ///
    /// Unrecognized values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let store = StoreConfig::from_env();
        if store.label != StoreConfig::default().label {
            config.store.label = store.label;
        }
        config.store.log_transitions = store.log_transitions;
        if let Ok(val) = env::var("RECSTATE_HISTORY_MODE") {
            match HistoryMode::parse(&val) {
                Some(mode) => config.history_mode = mode,
                None => tracing::warn!(value = %val, "ignoring unknown RECSTATE_HISTORY_MODE"),
            }
        }
        if let Ok(val) = env::var("RECSTATE_ARRAY_FORMAT") {
            match ArrayFormat::parse(&val) {
                Some(format) => config.array_format = format,
                None => tracing::warn!(value = %val, "ignoring unknown RECSTATE_ARRAY_FORMAT"),
            }
        }
        if let Some(flag) = env_flag("RECSTATE_SKIP_NULLS") {
            config.skip_nulls = flag;
        }
        config
    }

    #[must_use]
    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = mode;
        self
    }

    #[must_use]
    pub fn with_array_format(mut self, format: ArrayFormat) -> Self {
        self.array_format = format;
        self
    }

    #[must_use]
    pub fn with_skip_nulls(mut self, skip: bool) -> Self {
        self.skip_nulls = skip;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.label, "record");
        assert!(!store.log_transitions);

        let search = SearchConfig::default();
        assert_eq!(search.history_mode, HistoryMode::Replace);
        assert_eq!(search.array_format, ArrayFormat::Repeat);
        assert!(search.skip_nulls);
        assert_eq!(search.store.label, "search");
    }

    #[test]
    fn builders() {
        let config = SearchConfig::default()
            .with_history_mode(HistoryMode::Push)
            .with_array_format(ArrayFormat::Comma)
            .with_skip_nulls(false)
            .with_store(StoreConfig::default().with_label("filters").with_log_transitions(true));
        assert_eq!(config.history_mode, HistoryMode::Push);
        assert_eq!(config.array_format, ArrayFormat::Comma);
        assert!(!config.skip_nulls);
        assert_eq!(config.store.label, "filters");
        assert!(config.store.log_transitions);
    }

    #[test]
    fn parse_modes() {
        assert_eq!(HistoryMode::parse("PUSH"), Some(HistoryMode::Push));
        assert_eq!(HistoryMode::parse("bogus"), None);
        assert_eq!(ArrayFormat::parse("comma"), Some(ArrayFormat::Comma));
    }

    #[test]
    fn serde_partial_document() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"history_mode":"push"}"#).expect("valid config");
        assert_eq!(config.history_mode, HistoryMode::Push);
        assert!(config.skip_nulls);
    }
}
