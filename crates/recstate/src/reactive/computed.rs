#![forbid(unsafe_code)]

//! Lazy derived values that follow [`Observable`] dependencies.
//!
//! A [`Computed<T>`] caches the result of a compute function. Any change in a
//! dependency marks the cache dirty; the next read recomputes it. Stores use
//! this to expose a single field as its own derived view.
//!
//! Dirty marking arrives through subscriptions, which a
//! [`BatchScope`](super::BatchScope) defers. Reads therefore also compare the
//! source versions seen at the last computation with the current ones, so a
//! read inside a batch reflects writes made earlier in the same batch.
//!
//! # Invariants
//!
//! 1. Reads never return a value older than the latest dependency change.
//! 2. The compute function runs at most once per dirty cycle.
//! 3. `version` increments by exactly 1 per recomputation.
//!
//! If a source observable is dropped, the computed keeps its last cached value
//! and never becomes dirty from that source again.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::observable::{Observable, Subscription};

struct ComputedInner<T> {
    compute: Box<dyn Fn() -> T>,
    cached: Option<T>,
    dirty: Cell<bool>,
    version: u64,
    /// Version readers for each tracked source.
    sources: Vec<Box<dyn Fn() -> u64>>,
    /// Source versions at the last computation.
    seen: Vec<u64>,
    /// Keeps the dependency callbacks registered.
    _subscriptions: Vec<Subscription>,
}

/// A memoized value derived from one or more observables.
///
/// Cloning a `Computed` creates a new handle to the **same** cache.
pub struct Computed<T> {
    inner: Rc<RefCell<ComputedInner<T>>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Computed")
            .field("cached", &inner.cached)
            .field("dirty", &inner.dirty.get())
            .field("version", &inner.version)
            .finish()
    }
}

fn mark_dirty_on<S, T>(source: &Observable<S>, target: Weak<RefCell<ComputedInner<T>>>) -> Subscription
where
    S: Clone + PartialEq + 'static,
    T: 'static,
{
    source.subscribe(move |_| {
        if let Some(strong) = target.upgrade() {
            strong.borrow().dirty.set(true);
        }
    })
}

fn version_of<S: Clone + PartialEq + 'static>(source: &Observable<S>) -> Box<dyn Fn() -> u64> {
    let source = source.clone();
    Box::new(move || source.version())
}

impl<T> ComputedInner<T> {
    fn source_versions(&self) -> Vec<u64> {
        self.sources.iter().map(|version| version()).collect()
    }

    fn is_stale(&self) -> bool {
        self.dirty.get() || self.cached.is_none() || self.source_versions() != self.seen
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Derive a value from one observable.
    pub fn from_observable<S: Clone + PartialEq + 'static>(
        source: &Observable<S>,
        map: impl Fn(&S) -> T + 'static,
    ) -> Self {
        let reader = source.clone();
        let computed = Self::from_fn(move || reader.with(|v| map(v)), Vec::new());
        let sub = mark_dirty_on(source, Rc::downgrade(&computed.inner));
        {
            let mut inner = computed.inner.borrow_mut();
            inner._subscriptions.push(sub);
            inner.sources.push(version_of(source));
        }
        computed
    }

    /// Derive a value from two observables.
    pub fn from2<S1, S2>(
        s1: &Observable<S1>,
        s2: &Observable<S2>,
        map: impl Fn(&S1, &S2) -> T + 'static,
    ) -> Self
    where
        S1: Clone + PartialEq + 'static,
        S2: Clone + PartialEq + 'static,
    {
        let (r1, r2) = (s1.clone(), s2.clone());
        let computed = Self::from_fn(move || r1.with(|a| r2.with(|b| map(a, b))), Vec::new());
        let sub1 = mark_dirty_on(s1, Rc::downgrade(&computed.inner));
        let sub2 = mark_dirty_on(s2, Rc::downgrade(&computed.inner));
        {
            let mut inner = computed.inner.borrow_mut();
            inner._subscriptions.extend([sub1, sub2]);
            inner.sources.extend([version_of(s1), version_of(s2)]);
        }
        computed
    }

    /// Low-level constructor: the caller owns dependency wiring and must call
    /// [`invalidate`](Self::invalidate) when inputs change.
    pub fn from_fn(compute: impl Fn() -> T + 'static, subscriptions: Vec<Subscription>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ComputedInner {
                compute: Box::new(compute),
                cached: None,
                dirty: Cell::new(true),
                version: 0,
                sources: Vec::new(),
                seen: Vec::new(),
                _subscriptions: subscriptions,
            })),
        }
    }

    /// Current value, recomputed first if stale.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Borrow the current value, recomputing first if stale.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        let stale = inner.is_stale();
        let fresh = match inner.cached.take() {
            Some(value) if !stale => value,
            _ => {
                let seen = inner.source_versions();
                let value = (inner.compute)();
                inner.seen = seen;
                inner.dirty.set(false);
                inner.version += 1;
                value
            }
        };
        let result = f(&fresh);
        inner.cached = Some(fresh);
        result
    }

    /// Whether the next read will recompute.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().is_stale()
    }

    /// Force the next read to recompute.
    pub fn invalidate(&self) {
        self.inner.borrow().dirty.set(true);
    }

    /// Number of recomputations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }
}
