use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::game::CanonicalKey;

/// State-value table keyed by canonical board position.
///
/// Entries are only ever added or adjusted, never removed. Pinned entries
/// (terminal positions) are fixed once set: [`ValueTable::set`] refuses them
/// and [`ValueTable::pin`] leaves an existing pin untouched.
///
/// Serializes as a flat `key -> value` map in key order. Pins are not part
/// of the serialized form; the owner re-derives them after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTable {
    values: BTreeMap<CanonicalKey, f64>,
    #[serde(skip)]
    pinned: HashSet<CanonicalKey>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_pinned(&self, key: &CanonicalKey) -> bool {
        self.pinned.contains(key)
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    /// Store `value` unless the key is pinned. Returns whether it was stored.
    pub fn set(&mut self, key: CanonicalKey, value: f64) -> bool {
        if self.pinned.contains(&key) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Fix `key` at `value`. A key that is already pinned keeps its value.
    pub fn pin(&mut self, key: CanonicalKey, value: f64) -> f64 {
        if let Some(existing) = self.pinned.get(&key).and_then(|k| self.values.get(k)) {
            return *existing;
        }
        self.values.insert(key.clone(), value);
        self.pinned.insert(key);
        value
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, f64)> {
        self.values.iter().map(|(k, &v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.values.keys()
    }
}

/// Tables compare by their stored values; pins are derived state.
impl PartialEq for ValueTable {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
