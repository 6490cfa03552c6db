use super::DatasetError;
use crate::model::{FeedEntity, SurrogateKey};
use indexmap::{map::Entry, IndexMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// insertion-ordered table of GTFS rows keyed by [`FeedEntity::key`].
///
/// reads and writes go through an [`RwLock`] so a table can be filled from
/// many worker threads at once. rows are only ever added whole or updated in place,
/// so a poisoned lock still guards a consistent map and is recovered.
#[derive(Debug)]
pub struct EntityTable<T: FeedEntity> {
    rows: RwLock<IndexMap<T::Key, T>>,
}

impl<T: FeedEntity> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(IndexMap::new()),
        }
    }
}

impl<T: FeedEntity> Clone for EntityTable<T> {
    fn clone(&self) -> Self {
        Self {
            rows: RwLock::new(self.read().clone()),
        }
    }
}

impl<T: FeedEntity> EntityTable<T> {
    pub fn new() -> EntityTable<T> {
        Self::default()
    }

    /// the rows of this table in insertion order.
    pub fn values(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    pub fn get(&self, key: &T::Key) -> Option<T> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// adds a row whose identifiers are already final. a row with a key
    /// already in the table is rejected and the existing row is kept.
    pub fn insert(&self, row: T) -> Result<(), DatasetError> {
        let mut rows = self.write();
        match rows.entry(row.key()) {
            Entry::Occupied(e) => Err(DatasetError::DuplicateKey {
                table: T::TABLE,
                key: e.key().to_string(),
            }),
            Entry::Vacant(e) => {
                e.insert(row);
                Ok(())
            }
        }
    }

    /// applies `op` to every row in place. `op` must not change the key.
    pub fn update_all<F>(&self, op: F)
    where
        F: FnMut(&mut T),
    {
        self.write().values_mut().for_each(op)
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<T::Key, T>> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<T::Key, T>> {
        self.rows.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: FeedEntity<Key = SurrogateKey>> EntityTable<T> {
    /// largest surrogate key in this table, if any rows exist.
    pub fn max_surrogate_key(&self) -> Option<SurrogateKey> {
        self.read().keys().max().copied()
    }
}
