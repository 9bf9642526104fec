//! Keyed result store
//!
//! A run accumulates its metric tables and figures in two maps keyed by
//! composite keys. Adapters log into [`AdapterLogs`] (keyed by
//! [`AdapterKey`]); those logs only enter a run store through
//! [`TableStore::merge_adapter_logs`], which injects the producer's
//! [`DataOrigin`].
//!
//! ## Example
//!
//! ```rust
//! use trueno_pipeline::keys::{AbstractionLevel, AdapterKey, DataOrigin, ProcessPhase, TableKey};
//! use trueno_pipeline::store::{AdapterLogs, TableStore};
//! use trueno_pipeline::table::TableBuilder;
//!
//! let mut logs = AdapterLogs::default();
//! logs.insert(
//!     AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Train),
//!     TableBuilder::new().build()?,
//! );
//!
//! let mut store = TableStore::new();
//! store.merge_adapter_logs(logs, DataOrigin::Model);
//!
//! let key = TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train);
//! assert!(store.contains(&key));
//! # Ok::<(), trueno_pipeline::Error>(())
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::figure::Figure;
use crate::keys::{AbstractionLevel, AdapterKey, DataOrigin, FigureKey, TableKey};
use crate::table::Table;
use crate::{Error, Result};

/// An adapter's private log: tables keyed before origin injection.
pub type AdapterLogs = FxHashMap<AdapterKey, Table>;

/// Metric tables of a run.
pub type TableStore = KeyedStore<TableKey, Table>;

/// Figures of a run.
pub type FigureStore = KeyedStore<FigureKey, Figure>;

/// Hash map from composite keys to values with fallible lookup.
///
/// Lookups of absent keys are logic errors and fail with
/// [`Error::KeyNotFound`] rather than returning `None`.
#[derive(Debug, Clone)]
pub struct KeyedStore<K, V> {
    entries: FxHashMap<K, V>,
}

impl<K, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Ord + fmt::Display,
{
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Get the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if the key is absent
    pub fn get(&self, key: &K) -> Result<&V> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Get the value stored under `key`, if any.
    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Remove and return the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if the key is absent
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.entries
            .remove(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Check if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Keys in ascending order (stable file and log output).
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<&K> {
        let mut keys: Vec<&K> = self.entries.keys().collect();
        keys.sort();
        keys
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key-set union; on collision the value from `other` wins.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }
}

impl KeyedStore<TableKey, Table> {
    /// Tag every adapter-local key with `origin` and insert the tables.
    ///
    /// Entries already present under the same table key are replaced.
    pub fn merge_adapter_logs(&mut self, logs: AdapterLogs, origin: DataOrigin) {
        self.entries.extend(
            logs.into_iter()
                .map(|(key, table)| (key.with_origin(origin), table)),
        );
    }

    /// Keys at `level`, in ascending order.
    #[must_use]
    pub fn keys_at(&self, level: AbstractionLevel) -> Vec<TableKey> {
        self.sorted_keys()
            .into_iter()
            .filter(|key| key.abstraction_level() == level)
            .copied()
            .collect()
    }
}

/// Rekey an adapter's log under `origin`.
#[must_use]
pub fn tag_origin(logs: AdapterLogs, origin: DataOrigin) -> TableStore {
    let mut store = TableStore::new();
    store.merge_adapter_logs(logs, origin);
    store
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for KeyedStore<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> IntoIterator for KeyedStore<K, V> {
    type Item = (K, V);
    type IntoIter = std::collections::hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Column, ProcessPhase};
    use crate::table::float_column;

    fn table(value: f64) -> Table {
        float_column(Column::Loss, vec![Some(value)]).unwrap()
    }

    fn logs() -> AdapterLogs {
        let mut logs = AdapterLogs::default();
        logs.insert(
            AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Train),
            table(1.0),
        );
        logs.insert(
            AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Validation),
            table(2.0),
        );
        logs.insert(
            AdapterKey::new(AbstractionLevel::Batch, ProcessPhase::Train),
            table(3.0),
        );
        logs
    }

    #[test]
    fn test_get_missing_key_fails() {
        let store = TableStore::new();
        let key = TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Test);

        let err = store.get(&key).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
        assert!(err.to_string().contains("TableKey(model, epoch, test)"));
    }

    #[test]
    fn test_put_get_remove() {
        let mut store = TableStore::new();
        let key = TableKey::new(DataOrigin::Trainer, AbstractionLevel::Epoch, ProcessPhase::Train);

        assert!(store.put(key, table(1.0)).is_none());
        assert!(store.put(key, table(2.0)).is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).unwrap().num_rows(), 1);

        store.remove(&key).unwrap();
        assert!(store.is_empty());
        assert!(store.remove(&key).is_err());
    }

    #[test]
    fn test_tag_origin_preserves_size_and_origin() {
        let input = logs();
        let tagged = tag_origin(input.clone(), DataOrigin::Trainer);

        assert_eq!(tagged.len(), input.len());
        assert!(tagged.keys().all(|key| key.origin() == DataOrigin::Trainer));
        for key in input.keys() {
            assert!(tagged.contains(&key.with_origin(DataOrigin::Trainer)));
        }
    }

    #[test]
    fn test_union_of_distinct_origins_has_no_collisions() {
        let trainer = tag_origin(logs(), DataOrigin::Trainer);
        let model = tag_origin(logs(), DataOrigin::Model);

        let merged = trainer.union(model);
        assert_eq!(merged.len(), 6);
    }

    #[test]
    fn test_union_collision_second_operand_wins() {
        let key = TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train);
        let first: TableStore = [(key, table(1.0))].into_iter().collect();
        let second: TableStore = [(key, table(9.0))].into_iter().collect();

        let merged = first.union(second);

        assert_eq!(merged.len(), 1);
        let values = crate::table::column_values(merged.get(&key).unwrap(), &Column::Loss).unwrap();
        assert_eq!(values, vec![Some(9.0)]);
    }

    #[test]
    fn test_keys_at_level_sorted() {
        let store = tag_origin(logs(), DataOrigin::Model);
        let epoch_keys = store.keys_at(AbstractionLevel::Epoch);

        assert_eq!(
            epoch_keys,
            vec![
                TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train),
                TableKey::new(
                    DataOrigin::Model,
                    AbstractionLevel::Epoch,
                    ProcessPhase::Validation
                ),
            ]
        );
    }
}
