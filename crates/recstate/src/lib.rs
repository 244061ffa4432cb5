#![forbid(unsafe_code)]

//! Small reactive state containers for single-threaded UI code.
//!
//! - [`RecordStore`]: a record of named fields with per-field setters,
//!   partial merge, and reset to the initial record.
//! - [`Switch`]: a boolean with `on`/`off`/`toggle`.
//! - [`FormModal`]: modal visibility paired with a form renderer.
//! - [`DiffTracker`]: reports which labelled values changed between two
//!   observations.
//! - [`SearchRecord`]: a record persisted into the query string of an
//!   injected [`Navigator`], reloading on every update.
//!
//! All containers sit on [`reactive::Observable`]. Writes are visible
//! immediately; wrap several writes in a [`BatchScope`] to surface them as a
//! single notification.

pub mod config;
pub mod diff;
pub mod error;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod modal;
pub mod navigation;
pub mod reactive;
pub mod record;
pub mod search;
pub mod store;
pub mod switch;

pub use config::{ArrayFormat, HistoryMode, SearchConfig, StoreConfig};
pub use diff::{DiffTracker, FieldChange};
pub use error::{Result, StoreError};
pub use modal::{FormModal, ModalHandle, ModalProps};
pub use navigation::{Location, MemoryHistory, Navigator, parse_query, parse_query_with, stringify_query};
pub use reactive::{BatchScope, Computed, Observable, Subscription, batch};
pub use record::{KeyPolicy, Record, record};
pub use search::{SearchOptions, SearchRecord};
pub use store::{FieldSetter, FieldSetters, RecordStore, Resetter, Updater};
pub use switch::Switch;
