#![forbid(unsafe_code)]

//! Reactive record store.
//!
//! A [`RecordStore`] owns one record of named fields. It captures the initial
//! record once, exposes the live record through an [`Observable`], and offers
//! four ways to change it:
//!
//! - [`FieldSetter::set`]: replace one field.
//! - [`FieldSetter::update`]: derive one field from its latest value.
//! - [`RecordStore::update`] / [`RecordStore::update_with`]: shallow-merge a
//!   partial record, given directly or computed from the latest record.
//! - [`RecordStore::reset`]: restore the initial record.
//!
//! # Invariants
//!
//! 1. For a fixed-key store the key set never changes after creation.
//! 2. A field setter changes exactly one key.
//! 3. `reset()` makes the record value-equal to `initial()`; `initial()` never
//!    changes.
//! 4. Every update reads the latest record, never a stale snapshot, so several
//!    updates issued in one [`BatchScope`](crate::reactive::BatchScope) all
//!    apply in call order and notify subscribers once.
//!
//! # Failure Modes
//!
//! Naming a field the store does not have returns
//! [`StoreError::KeyNotFound`] and leaves the record untouched.
//!
//! # Example
//!
//! ```
//! use recstate::{RecordStore, record};
//!
//! let store = RecordStore::new(record([
//!     ("name", "erda".to_string()),
//!     ("org", "erda".to_string()),
//! ]));
//! store.setters()["name"].update(|prev| prev.to_uppercase());
//! store.update(record([("org", "ERDA".to_string())]))?;
//! assert_eq!(store.get("name")?, "ERDA");
//!
//! store.reset();
//! assert_eq!(&store.current(), store.initial());
//! # Ok::<(), recstate::StoreError>(())
//! ```

use std::collections::BTreeMap;
use std::ops::Index;
use std::rc::Rc;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::reactive::{Computed, Observable, Subscription};
use crate::record::{self, KeyPolicy, Record};

struct StoreCore<V> {
    initial: Record<V>,
    current: Observable<Record<V>>,
    policy: KeyPolicy,
    config: StoreConfig,
}

impl<V: Clone + PartialEq + 'static> StoreCore<V> {
    fn set_field(&self, key: &str, value: V) -> Result<()> {
        self.update_field(key, move |_| value)
    }

    fn update_field(&self, key: &str, f: impl FnOnce(&V) -> V) -> Result<()> {
        let Some(latest) = self.current.with(|r| r.get(key).cloned()) else {
            return Err(self.reject(key));
        };
        let value = f(&latest);
        let before = self.current.version();
        self.current.update(|r| {
            if let Some(slot) = r.get_mut(key) {
                *slot = value;
            }
        });
        self.log_transition("record.set", before, 1);
        Ok(())
    }

    fn merge(&self, partial: Record<V>) -> Result<()> {
        let before = self.current.version();
        let mut outcome = Ok(0);
        self.current
            .update(|r| outcome = record::merge(r, partial, self.policy));
        match outcome {
            Ok(changed) => {
                self.log_transition("record.update", before, changed);
                Ok(())
            }
            Err(StoreError::KeyNotFound { key }) => Err(self.reject(&key)),
            Err(err) => Err(err),
        }
    }

    fn merge_with(&self, f: impl FnOnce(&Record<V>) -> Record<V>) -> Result<()> {
        let latest = self.current.get();
        self.merge(f(&latest))
    }

    fn reset(&self) {
        let before = self.current.version();
        self.current.set(self.initial.clone());
        self.log_transition("record.reset", before, self.initial.len());
    }

    fn reject(&self, key: &str) -> StoreError {
        tracing::warn!(store = %self.config.label, key, "unknown field");
        StoreError::key_not_found(key)
    }

    fn log_transition(&self, message: &'static str, before: u64, fields: usize) {
        if !self.config.log_transitions {
            return;
        }
        let version = self.current.version();
        if version != before {
            tracing::debug!(store = %self.config.label, fields, version, "{message}");
        }
    }
}

/// Setter for one field of a [`RecordStore`].
pub struct FieldSetter<V> {
    key: String,
    core: Rc<StoreCore<V>>,
}

impl<V> Clone for FieldSetter<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            core: Rc::clone(&self.core),
        }
    }
}

impl<V> std::fmt::Debug for FieldSetter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSetter").field("key", &self.key).finish()
    }
}

impl<V: Clone + PartialEq + 'static> FieldSetter<V> {
    /// The field this setter writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the field's value.
    pub fn set(&self, value: impl Into<V>) {
        self.report(self.core.set_field(&self.key, value.into()));
    }

    /// Replace the field with `f(latest value)`. `f` may read the store.
    pub fn update(&self, f: impl FnOnce(&V) -> V) {
        self.report(self.core.update_field(&self.key, f));
    }

    // Setters exist only for initial keys, and no public operation removes
    // one from a fixed-key store.
    fn report(&self, result: Result<()>) {
        if let Err(err) = result {
            tracing::error!(store = %self.core.config.label, key = %self.key, %err, "setter write dropped");
        }
    }
}

/// One [`FieldSetter`] per initial field, built once when the store is created.
pub struct FieldSetters<V> {
    setters: BTreeMap<String, FieldSetter<V>>,
}

impl<V> Clone for FieldSetters<V> {
    fn clone(&self) -> Self {
        Self {
            setters: self.setters.clone(),
        }
    }
}

impl<V> std::fmt::Debug for FieldSetters<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.setters.keys()).finish()
    }
}

impl<V> FieldSetters<V> {
    /// Checked lookup.
    pub fn field(&self, key: &str) -> Result<&FieldSetter<V>> {
        self.setters
            .get(key)
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }
}

/// # Panics
///
/// Panics if the store has no such field. Use [`FieldSetters::field`] for a
/// checked lookup.
impl<V> Index<&str> for FieldSetters<V> {
    type Output = FieldSetter<V>;

    fn index(&self, key: &str) -> &Self::Output {
        match self.setters.get(key) {
            Some(setter) => setter,
            None => panic!("record store has no field `{key}`"),
        }
    }
}

/// Detached merge handle, the third element of [`RecordStore::into_parts`].
pub struct Updater<V> {
    core: Rc<StoreCore<V>>,
}

impl<V> Clone for Updater<V> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<V: Clone + PartialEq + 'static> Updater<V> {
    /// See [`RecordStore::update`].
    pub fn update(&self, partial: Record<V>) -> Result<()> {
        self.core.merge(partial)
    }

    /// See [`RecordStore::update_with`].
    pub fn update_with(&self, f: impl FnOnce(&Record<V>) -> Record<V>) -> Result<()> {
        self.core.merge_with(f)
    }
}

/// Detached reset handle, the fourth element of [`RecordStore::into_parts`].
pub struct Resetter<V> {
    core: Rc<StoreCore<V>>,
}

impl<V> Clone for Resetter<V> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<V: Clone + PartialEq + 'static> Resetter<V> {
    pub fn reset(&self) {
        self.core.reset();
    }
}

/// A record of named fields with per-field setters, partial merge, and reset.
///
/// Cloning a `RecordStore` creates a new handle to the **same** record.
pub struct RecordStore<V = serde_json::Value> {
    core: Rc<StoreCore<V>>,
    setters: FieldSetters<V>,
}

impl<V> Clone for RecordStore<V> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            setters: self.setters.clone(),
        }
    }
}

impl<V: std::fmt::Debug + Clone + PartialEq + 'static> std::fmt::Debug for RecordStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("label", &self.core.config.label)
            .field("current", &self.core.current.get())
            .field("version", &self.core.current.version())
            .finish()
    }
}

impl<V: Clone + PartialEq + 'static> RecordStore<V> {
    /// Create a fixed-key store.
    pub fn new(initial: Record<V>) -> Self {
        Self::build(initial, KeyPolicy::Fixed, StoreConfig::default())
    }

    /// Create a fixed-key store with explicit configuration.
    pub fn with_config(initial: Record<V>, config: StoreConfig) -> Self {
        Self::build(initial, KeyPolicy::Fixed, config)
    }

    /// Create a store whose merges may add fields. `reset()` still restores
    /// exactly the initial fields.
    pub fn open(initial: Record<V>, config: StoreConfig) -> Self {
        Self::build(initial, KeyPolicy::Open, config)
    }

    fn build(initial: Record<V>, policy: KeyPolicy, config: StoreConfig) -> Self {
        let core = Rc::new(StoreCore {
            current: Observable::new(initial.clone()),
            initial,
            policy,
            config,
        });
        let setters = core
            .initial
            .keys()
            .map(|key| {
                let setter = FieldSetter {
                    key: key.clone(),
                    core: Rc::clone(&core),
                };
                (key.clone(), setter)
            })
            .collect();
        Self {
            core,
            setters: FieldSetters { setters },
        }
    }

    /// Split into `(current, setters, updater, resetter)`.
    pub fn into_parts(self) -> (Record<V>, FieldSetters<V>, Updater<V>, Resetter<V>) {
        let current = self.current();
        let updater = Updater {
            core: Rc::clone(&self.core),
        };
        let resetter = Resetter {
            core: Rc::clone(&self.core),
        };
        (current, self.setters, updater, resetter)
    }

    /// Snapshot of the latest record.
    #[must_use]
    pub fn current(&self) -> Record<V> {
        self.core.current.get()
    }

    /// Borrow the latest record.
    pub fn with<R>(&self, f: impl FnOnce(&Record<V>) -> R) -> R {
        self.core.current.with(f)
    }

    /// Latest value of one field.
    pub fn get(&self, key: &str) -> Result<V> {
        self.core
            .current
            .with(|r| r.get(key).cloned())
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    /// The record captured at creation.
    #[must_use]
    pub fn initial(&self) -> &Record<V> {
        &self.core.initial
    }

    #[must_use]
    pub fn setters(&self) -> &FieldSetters<V> {
        &self.setters
    }

    #[must_use]
    pub fn key_policy(&self) -> KeyPolicy {
        self.core.policy
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.core.config
    }

    /// Replace one field.
    pub fn set(&self, key: &str, value: impl Into<V>) -> Result<()> {
        self.core.set_field(key, value.into())
    }

    /// Replace one field with `f(latest value)`. `f` runs with no borrow
    /// held, so it may read this store.
    pub fn update_field(&self, key: &str, f: impl FnOnce(&V) -> V) -> Result<()> {
        self.core.update_field(key, f)
    }

    /// Shallow-merge `partial`. On a fixed-key store an unknown key rejects
    /// the whole merge.
    pub fn update(&self, partial: Record<V>) -> Result<()> {
        self.core.merge(partial)
    }

    /// Shallow-merge the record returned by `f`, which receives a snapshot of
    /// the latest record and may read this store.
    pub fn update_with(&self, f: impl FnOnce(&Record<V>) -> Record<V>) -> Result<()> {
        self.core.merge_with(f)
    }

    /// Restore the initial record. A no-op when already equal.
    pub fn reset(&self) {
        self.core.reset();
    }

    /// Number of effective changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.core.current.version()
    }

    /// Register a callback run with the new record after each change.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&Record<V>) + 'static) -> Subscription {
        self.core.current.subscribe(callback)
    }

    /// The underlying observable. Crate-private: writing it directly would
    /// bypass the key policy.
    pub(crate) fn observable(&self) -> &Observable<Record<V>> {
        &self.core.current
    }

    /// A derived view of one field.
    pub fn computed_field(&self, key: &str) -> Result<Computed<V>> {
        let fallback = self
            .core
            .initial
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::key_not_found(key))?;
        let key = key.to_string();
        Ok(Computed::from_observable(&self.core.current, move |r| {
            r.get(&key).cloned().unwrap_or_else(|| fallback.clone())
        }))
    }
}
