#![forbid(unsafe_code)]

//! Reactive primitives the stores are built on.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BatchScope`]: RAII guard deferring notifications until the outermost
//!   scope exits, so several writes in one event turn surface as one change.
//! - [`Computed`]: a lazily evaluated, memoized value derived from
//!   observables.
//!
//! # Architecture
//!
//! Everything is single-threaded: `Observable<T>` uses `Rc<RefCell<..>>`, and
//! the batch context is thread-local. Each store owns its own observable;
//! nothing is shared across store instances unless a handle is cloned.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. Within a `BatchScope`, writes apply immediately and notifications are
//!    deferred until the outermost scope exits.

pub mod batch;
pub mod computed;
pub mod observable;

pub use batch::{BatchScope, batch, is_batching};
pub use computed::Computed;
pub use observable::{Observable, Subscription};
