//! Contract tests for the state containers, exercised through the public API.
//!
//! Covers:
//! 1. Initialization snapshot.
//! 2. Literal field setter.
//! 3. Functional field setter.
//! 4. Partial update.
//! 5. Functional update.
//! 6. Reset restores the initial record and leaves `initial()` untouched.
//! 7. Updates issued in one batch merge against the latest value.
//! 8. Switch on/off/toggle.
//! 9. Modal toggle flips, `toggle(Some(true))` forces.
//!
//! Also: derived views stay fresh inside a batch, and transformers may read
//! the store they update.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use recstate::{
    BatchScope, FormModal, MemoryHistory, ModalProps, Record, RecordStore, SearchRecord,
    StoreError, Switch, batch, record,
};
use serde_json::{Value, json};

fn ab_store() -> RecordStore {
    RecordStore::new(record([("a", json!(1)), ("b", json!("x"))]))
}

#[test]
fn initialization_matches_input() {
    let store = ab_store();
    assert_eq!(store.current(), record([("a", json!(1)), ("b", json!("x"))]));
    assert_eq!(store.setters().keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn literal_setter_changes_one_field() {
    let store = ab_store();
    store.setters()["a"].set(2);
    assert_eq!(store.current()["a"], json!(2));
    assert_eq!(store.current()["b"], json!("x"));
}

#[test]
fn functional_setter_transforms_field() {
    let store = ab_store();
    store.setters()["b"].update(|prev| json!(prev.as_str().unwrap_or_default().to_uppercase()));
    assert_eq!(store.current()["b"], json!("X"));
}

#[test]
fn partial_update_merges_supplied_keys() {
    let store = RecordStore::new(record([("a", 1), ("b", 2)]));
    store.update(record([("b", 3)])).unwrap();
    assert_eq!(store.current(), record([("a", 1), ("b", 3)]));
}

#[test]
fn functional_update_merges_result() {
    let store = RecordStore::new(record([("a", 1), ("b", 3)]));
    store
        .update_with(|prev| {
            let mut next = prev.clone();
            next.insert("a".to_string(), prev["a"] + 1);
            next
        })
        .unwrap();
    assert_eq!(store.current(), record([("a", 2), ("b", 3)]));
}

#[test]
fn reset_after_mixed_mutations() {
    let initial = record([("name", json!("erda-fe")), ("org", json!("erda"))]);
    let store = RecordStore::new(initial.clone());
    let (_, setters, updater, resetter) = store.clone().into_parts();

    setters["name"].set("erda cloud");
    setters["name"].update(|prev| json!(prev.as_str().unwrap_or_default().to_uppercase()));
    assert_eq!(
        store.current(),
        record([("name", json!("ERDA CLOUD")), ("org", json!("erda"))])
    );

    updater.update(record([("org", json!("ERDA"))])).unwrap();
    updater
        .update_with(|prev| {
            let mut next = prev.clone();
            next.extend(initial.clone());
            next.insert("org".into(), json!("erda"));
            next
        })
        .unwrap();
    assert_eq!(store.current(), initial);

    store.setters()["org"].set("other");
    resetter.reset();
    assert_eq!(store.current(), initial);
    assert_eq!(store.initial(), &initial);
}

#[test]
fn batched_updates_never_read_stale_snapshot() {
    let store = RecordStore::new(record([("x", 0)]));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = store.subscribe(move |r| sink.borrow_mut().push(r["x"]));

    {
        let _scope = BatchScope::new();
        store.update(record([("x", 1)])).unwrap();
        store
            .update_with(|prev| record([("x", prev["x"] + 1)]))
            .unwrap();
        assert!(seen.borrow().is_empty());
    }
    assert_eq!(store.current()["x"], 2);
    assert_eq!(*seen.borrow(), vec![2]);
}

#[test]
fn derived_field_is_fresh_inside_batch() {
    let store = RecordStore::new(record([("x", 0), ("y", 0)]));
    let x = store.computed_field("x").unwrap();
    assert_eq!(x.get(), 0);

    let (stored, derived) = batch(|| {
        store.setters()["x"].set(5);
        (store.get("x").unwrap(), x.get())
    });
    assert_eq!((stored, derived), (5, 5));

    batch(|| {
        store.setters()["x"].update(|v| v + 1);
        assert_eq!(x.get(), 6);
        store.update(record([("x", 7)])).unwrap();
        assert_eq!(x.get(), 7);
    });
    assert_eq!(x.get(), 7);
}

#[test]
fn field_transformer_may_read_store() {
    let store = RecordStore::new(record([("a", 1), ("b", 10)]));
    let reader = store.clone();
    store.setters()["a"].update(|prev| prev + reader.get("b").unwrap_or_default());
    assert_eq!(store.current(), record([("a", 11), ("b", 10)]));

    store
        .update_field("b", |prev| prev * reader.current()["a"])
        .unwrap();
    assert_eq!(store.get("b").unwrap(), 110);
}

#[test]
fn record_transformer_may_read_store() {
    let store = RecordStore::new(record([("a", 1), ("b", 2)]));
    let reader = store.clone();
    batch(|| {
        store
            .update_with(|prev| record([("a", prev["a"] + reader.get("b").unwrap_or_default())]))
            .unwrap();
        store
            .update_with(|prev| record([("b", prev["a"] + reader.get("a").unwrap_or_default())]))
            .unwrap();
    });
    assert_eq!(store.current(), record([("a", 3), ("b", 6)]));
}

#[test]
fn batch_spanning_several_stores() {
    let filters = RecordStore::new(record([("owner", json!(null)), ("page", json!(1))]));
    let visible = Switch::new(false);
    let notifications = Rc::new(Cell::new(0));
    let n1 = Rc::clone(&notifications);
    let n2 = Rc::clone(&notifications);
    let _s1 = filters.subscribe(move |_| n1.set(n1.get() + 1));
    let _s2 = visible.subscribe(move |_| n2.set(n2.get() + 1));

    batch(|| {
        filters.setters()["owner"].set("ops");
        filters.setters()["page"].update(|p| json!(p.as_i64().unwrap_or(0) + 1));
        visible.on();
    });
    assert_eq!(notifications.get(), 2);
    assert_eq!(filters.current()["page"], json!(2));
}

#[test]
fn unknown_field_is_key_not_found() {
    let store = ab_store();
    match store.update(record([("c", Value::Null)])) {
        Err(StoreError::KeyNotFound { key }) => assert_eq!(key, "c"),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
    assert_eq!(store.version(), 0);
}

#[test]
fn switch_sequence() {
    let switch = Switch::new(true);
    switch.off();
    assert!(!switch.value());
    switch.on();
    assert!(switch.value());
    switch.toggle();
    assert!(!switch.value());
}

#[test]
fn modal_open_cancel_toggle() {
    let modal = FormModal::new(false, |props: &ModalProps| {
        props.visible.then(|| props.handle.clone())
    });
    modal.toggle(Some(true));
    let cancel = modal.render().expect("form rendered while visible");
    cancel.close();
    assert!(modal.render().is_none());

    modal.toggle(None);
    assert!(modal.render().is_some());
    modal.toggle(None);
    assert!(modal.render().is_none());
}

#[test]
fn search_record_updates_location_and_reloads() {
    let history = MemoryHistory::default();
    let reloaded: Rc<RefCell<Vec<Record>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reloaded);
    let search = SearchRecord::new(history.clone(), move |q| sink.borrow_mut().push(q.clone()))
        .unwrap();

    assert!(search.current().is_empty());
    search.update(record([("name", json!("a"))]));
    assert_eq!(search.current(), record([("name", json!("a"))]));
    assert_eq!(history.entries().last().map(|l| l.search.as_str()), Some("?name=a"));
    assert_eq!(reloaded.borrow().len(), 1);
}
