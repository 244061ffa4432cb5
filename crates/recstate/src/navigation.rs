#![forbid(unsafe_code)]

//! Navigation context and query-string codec.
//!
//! Stores that persist into the address bar take a [`Navigator`] explicitly.
//! [`MemoryHistory`] is an in-process implementation with a browser-like
//! entry stack, used by hosts without a real location and by tests.
//!
//! # Query format
//!
//! - Keys are written in sorted order, `key=value` joined by `&`, without a
//!   leading `?`. Keys and values are percent-encoded.
//! - Strings are written as-is, numbers and booleans as their text form,
//!   objects as compact JSON.
//! - Arrays become repeated keys (`tag=a&tag=b`) or one comma-joined value,
//!   per [`ArrayFormat`].
//! - `null` is skipped when `skip_nulls` is set, otherwise written as `key=`.
//!
//! Parsing accepts an optional leading `?`, decodes `+` as a space, turns
//! repeated keys into arrays, and yields every scalar as a string. Under
//! [`ArrayFormat::Comma`] a decoded value containing `,` is split into an
//! array, so comma-joined arrays survive a round trip. A one-element array
//! comes back as a plain string in either format.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::config::{ArrayFormat, HistoryMode, SearchConfig};
use crate::error::{Result, StoreError};
use crate::record::Record;

/// Path and search string of one history entry. `search` keeps its leading
/// `?` and is empty when there is no query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: normalize_search(&search.into()),
        }
    }
}

fn normalize_search(search: &str) -> String {
    let bare = search.strip_prefix('?').unwrap_or(search);
    if bare.is_empty() {
        String::new()
    } else {
        format!("?{bare}")
    }
}

/// Read and write access to the current location.
pub trait Navigator {
    fn location(&self) -> Location;

    /// Point the current path at a new search string (with or without `?`).
    fn navigate(&self, search: &str, mode: HistoryMode);
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<Location>,
    index: usize,
}

/// In-memory history stack. Clones share the same stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    state: Rc<RefCell<HistoryState>>,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            state: Rc::new(RefCell::new(HistoryState {
                entries: vec![initial],
                index: 0,
            })),
        }
    }

    /// Visit a new location, dropping any forward entries.
    pub fn push(&self, location: Location) {
        let mut state = self.state.borrow_mut();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(location);
        state.index = keep;
    }

    /// Overwrite the current entry.
    pub fn replace(&self, location: Location) {
        let mut state = self.state.borrow_mut();
        let index = state.index;
        state.entries[index] = location;
    }

    /// Step back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.index == 0 {
            return false;
        }
        state.index -= 1;
        true
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Location> {
        self.state.borrow().entries.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Location::new("/", ""))
    }
}

impl Navigator for MemoryHistory {
    fn location(&self) -> Location {
        let state = self.state.borrow();
        state.entries[state.index].clone()
    }

    fn navigate(&self, search: &str, mode: HistoryMode) {
        let next = Location::new(self.location().pathname, search);
        match mode {
            HistoryMode::Replace => self.replace(next),
            HistoryMode::Push => self.push(next),
        }
    }
}

fn decode(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|err| StoreError::invalid_query(format!("{raw}: {err}")))
}

/// Parse a search string into a record of string (or string array) values,
/// using the default [`SearchConfig`].
pub fn parse_query(search: &str) -> Result<Record> {
    parse_query_with(search, &SearchConfig::default())
}

/// Parse a search string, reading arrays the way `config` writes them.
pub fn parse_query_with(search: &str, config: &SearchConfig) -> Result<Record> {
    let bare = search.strip_prefix('?').unwrap_or(search);
    let mut query: Record = Record::new();
    for pair in bare.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(raw_key)?;
        if key.is_empty() {
            continue;
        }
        let text = decode(raw_value)?;
        let value = match config.array_format {
            ArrayFormat::Comma if text.contains(',') => {
                Value::Array(text.split(',').map(|t| Value::String(t.to_string())).collect())
            }
            _ => Value::String(text),
        };
        match query.get_mut(&key) {
            Some(existing) => {
                let mut items = match existing.take() {
                    Value::Array(items) => items,
                    first => vec![first],
                };
                match value {
                    Value::Array(more) => items.extend(more),
                    value => items.push(value),
                }
                *existing = Value::Array(items);
            }
            None => {
                query.insert(key, value);
            }
        }
    }
    Ok(query)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Serialize a record into a search string (no leading `?`).
#[must_use]
pub fn stringify_query(query: &Record, config: &SearchConfig) -> String {
    let mut pairs = Vec::new();
    for (key, value) in query {
        let key_enc = urlencoding::encode(key);
        match value {
            Value::Null if config.skip_nulls => {}
            Value::Null => pairs.push(format!("{key_enc}=")),
            Value::Array(items) => {
                let texts: Vec<String> = items.iter().filter_map(scalar_text).collect();
                match config.array_format {
                    ArrayFormat::Repeat => pairs.extend(
                        texts
                            .iter()
                            .map(|t| format!("{key_enc}={}", urlencoding::encode(t))),
                    ),
                    ArrayFormat::Comma if texts.is_empty() => {}
                    ArrayFormat::Comma => pairs.push(format!(
                        "{key_enc}={}",
                        urlencoding::encode(&texts.join(","))
                    )),
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push(format!("{key_enc}={}", urlencoding::encode(&text)));
                }
            }
        }
    }
    pairs.join("&")
}
