#![forbid(unsafe_code)]

//! Change observer for debugging re-render causes.
//!
//! [`DiffTracker`] keeps the `Debug` rendering of a labelled list of values
//! and reports which entries differ from the previous observation. It has no
//! side effects other than a `debug` log event per change.

use std::fmt::Debug;

use crate::error::{Result, StoreError};

/// One entry that differs between two observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub label: String,
    pub previous: String,
    pub current: String,
}

#[derive(Debug, Clone)]
pub struct DiffTracker {
    labels: Vec<String>,
    previous: Option<Vec<String>>,
}

impl DiffTracker {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            previous: None,
        }
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Compare `values` with the previous observation and remember them.
    ///
    /// The first observation only records a baseline and returns no changes.
    pub fn observe(&mut self, values: &[&dyn Debug]) -> Result<Vec<FieldChange>> {
        if values.len() != self.labels.len() {
            return Err(StoreError::LabelMismatch {
                labels: self.labels.len(),
                values: values.len(),
            });
        }
        let snapshot: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
        let changes = match &self.previous {
            None => Vec::new(),
            Some(previous) => self
                .labels
                .iter()
                .zip(previous.iter().zip(&snapshot))
                .filter(|(_, (before, after))| before != after)
                .map(|(label, (before, after))| {
                    tracing::debug!(label = %label, previous = %before, current = %after, "value changed");
                    FieldChange {
                        label: label.clone(),
                        previous: before.clone(),
                        current: after.clone(),
                    }
                })
                .collect(),
        };
        self.previous = Some(snapshot);
        Ok(changes)
    }

    /// Forget the baseline; the next observation records a fresh one.
    pub fn clear(&mut self) {
        self.previous = None;
    }
}
