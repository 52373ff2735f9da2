//! In-memory data source.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{DataSource, EntitySource};
use crate::error::{DataError, DataResult};
use crate::model::{Entity, EntityKey, Uid};

/// Keeps serialized entities in a map.
///
/// Values are stored as JSON, so a retrieve never aliases a cached value.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entities: HashMap<(&'static str, String), String>,
    next_uids: HashMap<&'static str, Uid>,
}

impl MemoryDataSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under its own key, keeping the uid counter ahead of it.
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn seed<V: Entity>(&self, value: &V) -> DataResult<()> {
        let key = value.key();
        self.store(&key, value)?;
        if let Some(uid) = key.as_uid() {
            let mut state = self.state.lock();
            let next = state.next_uids.entry(V::KIND).or_insert(1);
            *next = (*next).max(uid.saturating_add(1));
        }
        Ok(())
    }

    /// Number of stored entities across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entities.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entities.is_empty()
    }
}

impl<V: Entity> EntitySource<V> for MemoryDataSource {
    fn retrieve(&self, key: &V::Key) -> DataResult<V> {
        let state = self.state.lock();
        let json = state
            .entities
            .get(&(V::KIND, key.to_string()))
            .ok_or_else(|| DataError::NotFound {
                kind: V::KIND,
                key: key.to_string(),
            })?;
        Ok(serde_json::from_str(json)?)
    }

    fn store(&self, key: &V::Key, value: &V) -> DataResult<()> {
        let json = serde_json::to_string(value)?;
        self.state
            .lock()
            .entities
            .insert((V::KIND, key.to_string()), json);
        Ok(())
    }

    fn delete(&self, key: &V::Key) -> DataResult<()> {
        self.state.lock().entities.remove(&(V::KIND, key.to_string()));
        Ok(())
    }
}

impl DataSource for MemoryDataSource {
    fn next_uid(&self, kind: &'static str) -> DataResult<Uid> {
        let mut state = self.state.lock();
        let next = state.next_uids.entry(kind).or_insert(1);
        let uid = *next;
        if uid == Uid::MAX {
            return Err(DataError::UidExhausted(kind));
        }
        *next = uid + 1;
        Ok(uid)
    }
}
