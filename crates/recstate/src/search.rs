#![forbid(unsafe_code)]

//! Record synced to the location's query string.
//!
//! A [`SearchRecord`] starts from an optional initial query overlaid by the
//! navigator's current search string. Every [`update`](SearchRecord::update)
//! merges into the record, writes the merged query back through the
//! [`Navigator`], and then calls the reload callback with it.
//!
//! Unlike a fixed-key [`RecordStore`], the key set is open: any key may be
//! added, and with `skip_nulls` a `null` value removes its key.

use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::navigation::{Navigator, parse_query_with, stringify_query};
use crate::reactive::Subscription;
use crate::record::Record;
use crate::store::RecordStore;

/// Construction options for a [`SearchRecord`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Defaults for keys absent from the location.
    pub initial_query: Record,
    pub config: SearchConfig,
}

impl SearchOptions {
    #[must_use]
    pub fn with_initial_query(mut self, query: Record) -> Self {
        self.initial_query = query;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }
}

/// A query record persisted into a [`Navigator`].
pub struct SearchRecord<N> {
    navigator: N,
    defaults: Record,
    store: RecordStore,
    config: SearchConfig,
    reload: Box<dyn Fn(&Record)>,
}

impl<N> std::fmt::Debug for SearchRecord<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRecord")
            .field("current", &self.store.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn overlay(defaults: &Record, location_query: Record) -> Record {
    let mut query = defaults.clone();
    query.extend(location_query);
    query
}

impl<N: Navigator> SearchRecord<N> {
    /// Sync with `navigator` using default options.
    pub fn new(navigator: N, reload: impl Fn(&Record) + 'static) -> Result<Self> {
        Self::with_options(navigator, SearchOptions::default(), reload)
    }

    pub fn with_options(
        navigator: N,
        options: SearchOptions,
        reload: impl Fn(&Record) + 'static,
    ) -> Result<Self> {
        let location_query = parse_query_with(&navigator.location().search, &options.config)?;
        let initial = overlay(&options.initial_query, location_query);
        let store = RecordStore::open(initial, options.config.store.clone());
        Ok(Self {
            navigator,
            defaults: options.initial_query,
            store,
            config: options.config,
            reload: Box::new(reload),
        })
    }

    /// Latest merged query.
    #[must_use]
    pub fn current(&self) -> Record {
        self.store.current()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key).ok()
    }

    /// Merge `partial`, persist the result, then reload with it.
    pub fn update(&self, partial: Record) {
        let skip_nulls = self.config.skip_nulls;
        self.store.observable().update(|query| {
            for (key, value) in partial {
                if skip_nulls && value.is_null() {
                    query.remove(&key);
                } else {
                    query.insert(key, value);
                }
            }
        });
        self.persist_and_reload();
    }

    /// Merge the partial query returned by `f`, which receives a snapshot of
    /// the latest query, then persist and reload as [`update`](Self::update).
    pub fn update_with(&self, f: impl FnOnce(&Record) -> Record) {
        let latest = self.store.current();
        self.update(f(&latest));
    }

    /// Restore the query captured at creation, persist it, then reload.
    pub fn reset(&self) {
        self.store.reset();
        self.persist_and_reload();
    }

    /// Re-read the navigator after navigation that bypassed this record.
    /// Does not call the reload callback.
    pub fn sync_from_location(&self) -> Result<()> {
        let location_query = parse_query_with(&self.navigator.location().search, &self.config)?;
        self.store
            .observable()
            .set(overlay(&self.defaults, location_query));
        Ok(())
    }

    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&Record) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn persist_and_reload(&self) {
        let query = self.store.current();
        let search = stringify_query(&query, &self.config);
        if self.config.store.log_transitions {
            tracing::debug!(store = %self.config.store.label, search = %search, mode = ?self.config.history_mode, "search.persist");
        }
        self.navigator.navigate(&search, self.config.history_mode);
        (self.reload)(&query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArrayFormat, HistoryMode};
    use crate::navigation::{Location, MemoryHistory};
    use crate::record::record;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<Record>>>, impl Fn(&Record) + 'static) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |q: &Record| sink.borrow_mut().push(q.clone()))
    }

    #[test]
    fn empty_location_then_update() {
        let history = MemoryHistory::default();
        let (calls, reload) = recorder();
        let search = SearchRecord::new(history.clone(), reload).unwrap();
        assert!(search.current().is_empty());

        search.update(record([("name", json!("a"))]));
        assert_eq!(search.current(), record([("name", json!("a"))]));
        assert_eq!(history.location().search, "?name=a");
        assert_eq!(*calls.borrow(), vec![record([("name", json!("a"))])]);
    }

    #[test]
    fn location_overrides_initial_query() {
        let history = MemoryHistory::new(Location::new("/mr", "?state=open"));
        let options = SearchOptions::default()
            .with_initial_query(record([("state", json!("all")), ("pageNo", json!("1"))]));
        let search = SearchRecord::with_options(history, options, |_| {}).unwrap();
        assert_eq!(search.get("state"), Some(json!("open")));
        assert_eq!(search.get("pageNo"), Some(json!("1")));
    }

    #[test]
    fn null_removes_key() {
        let history = MemoryHistory::new(Location::new("/", "?a=1&b=2"));
        let search = SearchRecord::new(history.clone(), |_| {}).unwrap();
        search.update(record([("a", Value::Null)]));
        assert_eq!(search.get("a"), None);
        assert_eq!(history.location().search, "?b=2");
    }

    #[test]
    fn push_mode_appends_history() {
        let history = MemoryHistory::default();
        let options = SearchOptions::default()
            .with_config(SearchConfig::default().with_history_mode(HistoryMode::Push));
        let search = SearchRecord::with_options(history.clone(), options, |_| {}).unwrap();
        search.update(record([("p", json!(1))]));
        search.update(record([("p", json!(2))]));
        assert_eq!(history.len(), 3);
        assert_eq!(search.navigator().location().search, "?p=2");
    }

    #[test]
    fn reset_and_sync() {
        let history = MemoryHistory::new(Location::new("/", "?a=1"));
        let (calls, reload) = recorder();
        let search = SearchRecord::new(history.clone(), reload).unwrap();
        search.update(record([("b", json!("x"))]));
        search.reset();
        assert_eq!(search.current(), record([("a", json!("1"))]));
        assert_eq!(history.location().search, "?a=1");
        assert_eq!(calls.borrow().len(), 2);

        history.push(Location::new("/", "?a=9"));
        search.sync_from_location().unwrap();
        assert_eq!(search.get("a"), Some(json!("9")));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn functional_update_sees_latest_query() {
        let history = MemoryHistory::new(Location::new("/", "?pageNo=1"));
        let (calls, reload) = recorder();
        let search = SearchRecord::new(history.clone(), reload).unwrap();
        let next_page = |q: &Record| {
            let page = q
                .get("pageNo")
                .and_then(Value::as_str)
                .and_then(|p| p.parse::<u64>().ok())
                .unwrap_or(0);
            record([("pageNo", json!(page + 1))])
        };
        search.update_with(next_page);
        search.update_with(|q| record([("pageNo", json!(q["pageNo"].as_u64().unwrap_or(0) + 1))]));
        assert_eq!(search.get("pageNo"), Some(json!(3)));
        assert_eq!(history.location().search, "?pageNo=3");
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn comma_arrays_resync_as_arrays() {
        let history = MemoryHistory::default();
        let options = SearchOptions::default()
            .with_config(SearchConfig::default().with_array_format(ArrayFormat::Comma));
        let search = SearchRecord::with_options(history.clone(), options, |_| {}).unwrap();
        search.update(record([("tag", json!(["a", "b"]))]));
        assert_eq!(history.location().search, "?tag=a%2Cb");

        search.sync_from_location().unwrap();
        assert_eq!(search.get("tag"), Some(json!(["a", "b"])));
    }

    #[test]
    fn invalid_location_fails_construction() {
        let history = MemoryHistory::new(Location::new("/", "?q=%FF"));
        assert!(SearchRecord::new(history, |_| {}).is_err());
    }
}
