#![forbid(unsafe_code)]

//! Deferred notification batches.
//!
//! A [`BatchScope`] opens a thread-local batch. While any scope is alive,
//! observable writes apply immediately but their notifications are queued.
//! When the outermost scope drops, every queued observable is notified once,
//! in the order it was first mutated.
//!
//! Reads inside a batch always see the latest written value, so updates
//! computed from the previous state never observe a stale snapshot.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

#[derive(Default)]
struct BatchContext {
    depth: usize,
    pending: Vec<Box<dyn FnOnce()>>,
}

thread_local! {
    static BATCH: RefCell<BatchContext> = RefCell::new(BatchContext::default());
}

/// RAII guard deferring observable notifications until the outermost scope
/// exits.
///
/// The batch context is per thread, so the guard is `!Send`.
#[derive(Debug)]
#[must_use = "the batch ends when the scope is dropped"]
pub struct BatchScope {
    _not_send: PhantomData<Rc<()>>,
}

impl BatchScope {
    /// Open a (possibly nested) batch.
    pub fn new() -> Self {
        BATCH.with(|ctx| ctx.borrow_mut().depth += 1);
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let pending = BATCH.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            ctx.depth = ctx.depth.saturating_sub(1);
            if ctx.depth == 0 {
                std::mem::take(&mut ctx.pending)
            } else {
                Vec::new()
            }
        });
        if pending.is_empty() {
            return;
        }
        tracing::trace!(message = "batch.flush", notifications = pending.len());
        for notify in pending {
            notify();
        }
    }
}

/// Run `f` inside a batch and return its result.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let _scope = BatchScope::new();
    f()
}

/// Whether a batch is open on this thread.
#[must_use]
pub fn is_batching() -> bool {
    BATCH.with(|ctx| ctx.borrow().depth > 0)
}

pub(crate) fn defer(notify: impl FnOnce() + 'static) {
    BATCH.with(|ctx| ctx.borrow_mut().pending.push(Box::new(notify)));
}
