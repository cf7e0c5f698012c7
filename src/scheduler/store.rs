//! Keyed result store shared by sweep workers.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Concurrent append-only map from a sweep key to its per-repeat values.
///
/// Appends for the same key are independent; arrival order is discarded
/// when the store is drained, which orders each list by repeat index.
#[derive(Debug)]
pub struct KeyedStore<T> {
    entries: Mutex<BTreeMap<u64, Vec<(u32, T)>>>,
}

impl<T> Default for KeyedStore<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> KeyedStore<T> {
    /// Store with an empty list for every key.
    #[must_use]
    pub fn with_keys(keys: impl IntoIterator<Item = u64>) -> Self {
        let entries = keys.into_iter().map(|k| (k, Vec::new())).collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Append the value produced by repeat `repeat` of `key`.
    pub fn record(&self, key: u64, repeat: u32, value: T) {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entry(key).or_default().push((repeat, value));
    }

    /// Number of values recorded across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(Vec::len).sum()
    }

    /// Whether no value has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain into per-key lists ordered by repeat index.
    #[must_use]
    pub fn into_sorted(self) -> BTreeMap<u64, Vec<T>> {
        let entries = self
            .entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        entries
            .into_iter()
            .map(|(key, mut values)| {
                values.sort_by_key(|(repeat, _)| *repeat);
                (key, values.into_iter().map(|(_, v)| v).collect())
            })
            .collect()
    }
}

/// Store of area estimates.
pub type ResultStore = KeyedStore<f64>;
