#![forbid(unsafe_code)]

//! Boolean toggle store.

use crate::reactive::{Observable, Subscription};

/// A shared boolean with `on`, `off`, and `toggle`.
///
/// Cloning a `Switch` creates a new handle to the **same** flag.
#[derive(Debug, Clone)]
pub struct Switch {
    value: Observable<bool>,
}

impl Switch {
    #[must_use]
    pub fn new(initial: bool) -> Self {
        Self {
            value: Observable::new(initial),
        }
    }

    #[must_use]
    pub fn value(&self) -> bool {
        self.value.get()
    }

    pub fn on(&self) {
        self.value.set(true);
    }

    pub fn off(&self) {
        self.value.set(false);
    }

    pub fn toggle(&self) {
        self.value.update(|v| *v = !*v);
    }

    pub fn set(&self, value: bool) {
        self.value.set(value);
    }

    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&bool) + 'static) -> Subscription {
        self.value.subscribe(callback)
    }

    #[must_use]
    pub fn observable(&self) -> &Observable<bool> {
        &self.value
    }

    /// Split into `(value, on, off, toggle)` closures sharing this flag.
    pub fn into_parts(self) -> (bool, impl Fn(), impl Fn(), impl Fn()) {
        let value = self.value();
        let on = self.clone();
        let off = self.clone();
        let toggle = self;
        (
            value,
            move || on.on(),
            move || off.off(),
            move || toggle.toggle(),
        )
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(false)
    }
}
