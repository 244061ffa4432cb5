#![forbid(unsafe_code)]

//! Modal visibility paired with a form renderer.
//!
//! A [`FormModal`] owns a visibility flag and a form. Rendering hands the form
//! [`ModalProps`] carrying the current visibility and a [`ModalHandle`] the
//! form can use to close itself (the cancel action).

use crate::reactive::{Observable, Subscription};

/// Clonable control over a modal's visibility.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    visible: Observable<bool>,
}

impl ModalHandle {
    /// Flip visibility, or force it when `force` is given.
    pub fn toggle(&self, force: Option<bool>) {
        match force {
            Some(visible) => self.visible.set(visible),
            None => self.visible.update(|v| *v = !*v),
        }
    }

    pub fn open(&self) {
        self.visible.set(true);
    }

    pub fn close(&self) {
        self.visible.set(false);
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

/// What the form sees on each render.
#[derive(Debug, Clone)]
pub struct ModalProps {
    pub visible: bool,
    pub handle: ModalHandle,
}

impl ModalProps {
    /// Cancel action: hides the modal.
    pub fn on_cancel(&self) {
        self.handle.close();
    }
}

/// A visibility flag coupled with a form renderer producing `R`.
pub struct FormModal<R> {
    handle: ModalHandle,
    form: Box<dyn Fn(&ModalProps) -> R>,
}

impl<R> std::fmt::Debug for FormModal<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormModal")
            .field("visible", &self.handle.is_visible())
            .finish_non_exhaustive()
    }
}

impl<R> FormModal<R> {
    pub fn new(visible: bool, form: impl Fn(&ModalProps) -> R + 'static) -> Self {
        Self {
            handle: ModalHandle {
                visible: Observable::new(visible),
            },
            form: Box::new(form),
        }
    }

    /// Render the form with the current visibility.
    pub fn render(&self) -> R {
        let props = ModalProps {
            visible: self.handle.is_visible(),
            handle: self.handle.clone(),
        };
        (self.form)(&props)
    }

    /// Flip visibility, or force it when `force` is given.
    pub fn toggle(&self, force: Option<bool>) {
        self.handle.toggle(force);
    }

    pub fn open(&self) {
        self.handle.open();
    }

    pub fn close(&self) {
        self.handle.close();
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.handle.is_visible()
    }

    #[must_use]
    pub fn handle(&self) -> ModalHandle {
        self.handle.clone()
    }

    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&bool) + 'static) -> Subscription {
        self.handle.visible.subscribe(callback)
    }
}
