#![forbid(unsafe_code)]

//! The record shape shared by every store: field name to value.

use std::collections::BTreeMap;

use crate::error::{Result, StoreError};

/// A mapping from field name to value. Keys iterate in sorted order.
pub type Record<V = serde_json::Value> = BTreeMap<String, V>;

/// Build a record from key/value pairs.
pub fn record<K, V, I>(fields: I) -> Record<V>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Whether a merge may introduce keys the record does not already have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// The key set is frozen at creation. Unknown keys are errors.
    #[default]
    Fixed,
    /// Unknown keys are added.
    Open,
}

/// Shallow-merge `partial` into `target`.
///
/// Under [`KeyPolicy::Fixed`] every key of `partial` is checked before any is
/// applied, so a rejected merge leaves `target` untouched. Returns the number
/// of fields whose value actually changed.
pub fn merge<V: PartialEq>(
    target: &mut Record<V>,
    partial: Record<V>,
    policy: KeyPolicy,
) -> Result<usize> {
    if policy == KeyPolicy::Fixed
        && let Some(key) = partial.keys().find(|k| !target.contains_key(*k))
    {
        return Err(StoreError::key_not_found(key.clone()));
    }
    let mut changed = 0;
    for (key, value) in partial {
        match target.get_mut(&key) {
            Some(slot) if *slot == value => {}
            Some(slot) => {
                *slot = value;
                changed += 1;
            }
            None => {
                target.insert(key, value);
                changed += 1;
            }
        }
    }
    Ok(changed)
}
