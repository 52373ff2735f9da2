//! # Entity Storage
//!
//! Per-kind cache of resident entities in front of a backing store.
//!
//! ## Design
//!
//! ```text
//!            ┌──────────── Storage<V> ─────────────┐
//! get(key) ─►│ Mutex<HashMap<Key, Arc<Slot<V>>>>   │── miss ──► adapter.retrieve
//!            │                                     │
//! tick() ───►│ dirty slots ────────────────────────│──────────► adapter.store
//!            └─────────────────────────────────────┘
//! ```
//!
//! - The map lock is never held across a backing-store call or a consumer
//! - Adapter errors are logged here with kind and key and turned into
//!   unavailability (reads) or a still-dirty slot (writes)

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};
use crate::model::{Entity, EntityKey};
use crate::record::{Record, Slot};
use crate::source::EntitySource;

/// Loads one entity from the backing store.
pub type RetrieveFn<V> = Box<dyn Fn(&<V as Entity>::Key) -> DataResult<V> + Send + Sync>;

/// Persists one entity to the backing store.
pub type StoreFn<V> = Box<dyn Fn(&<V as Entity>::Key, &V) -> DataResult<()> + Send + Sync>;

/// Removes one entity from the backing store.
pub type DeleteFn<V> = Box<dyn Fn(&<V as Entity>::Key) -> DataResult<()> + Send + Sync>;

/// Backing-store operations of one entity kind.
pub struct StorageAdapter<V: Entity> {
    /// Loads an entity.
    pub retrieve: RetrieveFn<V>,
    /// Persists an entity.
    pub store: StoreFn<V>,
    /// Removes an entity.
    pub delete: DeleteFn<V>,
}

impl<V: Entity> StorageAdapter<V> {
    /// Adapter over explicit closures.
    pub fn new(
        retrieve: impl Fn(&V::Key) -> DataResult<V> + Send + Sync + 'static,
        store: impl Fn(&V::Key, &V) -> DataResult<()> + Send + Sync + 'static,
        delete: impl Fn(&V::Key) -> DataResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            retrieve: Box::new(retrieve),
            store: Box::new(store),
            delete: Box::new(delete),
        }
    }

    /// Adapter forwarding to a data source.
    pub fn from_source<S>(source: &Arc<S>) -> Self
    where
        S: EntitySource<V> + ?Sized + 'static,
    {
        let retrieve_source = Arc::clone(source);
        let store_source = Arc::clone(source);
        let delete_source = Arc::clone(source);
        Self::new(
            move |key| retrieve_source.retrieve(key),
            move |key, value| store_source.store(key, value),
            move |key| delete_source.delete(key),
        )
    }
}

/// Outcome of a flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Entities written to the backing store.
    pub flushed: usize,
    /// Entities whose write failed and stay dirty.
    pub failed: usize,
}

impl FlushStats {
    /// Adds another flush outcome.
    pub fn merge(&mut self, other: Self) {
        self.flushed += other.flushed;
        self.failed += other.failed;
    }
}

/// Cache of one entity kind.
pub struct Storage<V: Entity> {
    adapter: StorageAdapter<V>,
    slots: Mutex<HashMap<V::Key, Arc<Slot<V>>>>,
}

impl<V: Entity> Storage<V> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new(adapter: StorageAdapter<V>) -> Self {
        Self {
            adapter,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a record for `key`, loading it from the backing store on a miss.
    ///
    /// `None` when the key is the sentinel or the entity cannot be loaded.
    pub fn get(&self, key: &V::Key) -> Option<Record<V>> {
        self.lookup(key).ok().flatten()
    }

    /// Like [`Storage::get`], but keeps a backing store failure apart from
    /// an entity that does not exist.
    ///
    /// `Ok(None)` for the sentinel key and for [`DataError::NotFound`].
    ///
    /// # Errors
    ///
    /// Any other retrieve failure.
    pub fn lookup(&self, key: &V::Key) -> DataResult<Option<Record<V>>> {
        if key.is_sentinel() {
            return Ok(None);
        }
        if let Some(slot) = self.slots.lock().get(key) {
            return Ok(Some(Record::bound(key.clone(), slot)));
        }

        match (self.adapter.retrieve)(key) {
            Ok(value) => {
                let mut slots = self.slots.lock();
                // Another thread may have loaded it meanwhile, keep theirs.
                let slot = slots
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Slot::new(value, false)));
                Ok(Some(Record::bound(key.clone(), slot)))
            }
            Err(err) => {
                log_failure::<V>("retrieve", key, &err);
                match err {
                    DataError::NotFound { .. } => Ok(None),
                    err => Err(err),
                }
            }
        }
    }

    /// Returns records for every key, or `None` if any one is unavailable.
    pub fn get_many(&self, keys: &[V::Key]) -> Option<Vec<Record<V>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Inserts the entity built by `factory` as a new dirty slot.
    ///
    /// `None` when the factory fails, yields a sentinel key, or the key is
    /// already resident.
    pub fn create<F>(&self, factory: F) -> Option<Record<V>>
    where
        F: FnOnce() -> DataResult<(V::Key, V)>,
    {
        let (key, value) = match factory() {
            Ok(created) => created,
            Err(err) => {
                warn!(kind = V::KIND, "failed to create: {err}");
                return None;
            }
        };
        if key.is_sentinel() {
            warn!(kind = V::KIND, "factory produced the sentinel key");
            return None;
        }

        let mut slots = self.slots.lock();
        if slots.contains_key(&key) {
            let err = DataError::AlreadyExists {
                kind: V::KIND,
                key: key.to_string(),
            };
            log_failure::<V>("create", &key, &err);
            return None;
        }
        let slot = Arc::new(Slot::new(value, true));
        let record = Record::bound(key.clone(), &slot);
        slots.insert(key, slot);
        Some(record)
    }

    /// Writes every dirty entity to the backing store.
    ///
    /// Failed writes stay dirty and are retried on the next tick.
    pub fn tick(&self) -> FlushStats {
        let dirty: Vec<(V::Key, Arc<Slot<V>>)> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.is_dirty())
            .map(|(key, slot)| (key.clone(), Arc::clone(slot)))
            .collect();

        let mut stats = FlushStats::default();
        for (key, slot) in dirty {
            // Writers mark dirty under the write lock, so holding the read
            // lock here means no update can slip between store and clear.
            let value = slot.read();
            if !slot.take_dirty() {
                continue;
            }
            match (self.adapter.store)(&key, &*value) {
                Ok(()) => stats.flushed += 1,
                Err(err) => {
                    slot.mark_dirty();
                    stats.failed += 1;
                    log_failure::<V>("store", &key, &err);
                }
            }
        }
        stats
    }

    /// Final synchronous flush.
    pub fn terminate(&self) -> FlushStats {
        let stats = self.tick();
        if stats.failed > 0 {
            warn!(
                kind = V::KIND,
                failed = stats.failed,
                "entities left unsaved at shutdown"
            );
        }
        debug!(kind = V::KIND, flushed = stats.flushed, "storage terminated");
        stats
    }

    /// Removes the entity from the cache and the backing store.
    ///
    /// Outstanding records become unavailable. Returns whether the backing
    /// store accepted the delete.
    pub fn delete(&self, key: &V::Key) -> bool {
        if let Some(slot) = self.slots.lock().remove(key) {
            slot.retire();
        }
        match (self.adapter.delete)(key) {
            Ok(()) => true,
            Err(err) => {
                log_failure::<V>("delete", key, &err);
                false
            }
        }
    }

    /// Drops a clean resident entity without touching the backing store.
    ///
    /// Dirty entities and entities a record is currently reading or
    /// writing are kept. Returns whether it was evicted.
    pub fn evict(&self, key: &V::Key) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get(key).map(Arc::clone) else {
            return false;
        };
        // Writers mark dirty before releasing the write lock, so the flag is
        // final while we hold it.
        let Some(guard) = slot.value.try_write() else {
            debug!(kind = V::KIND, key = %key, "entity in use, not evicted");
            return false;
        };
        if slot.is_dirty() {
            return false;
        }
        slot.retire();
        drop(guard);
        slots.remove(key);
        true
    }

    /// Whether `key` is resident.
    #[must_use]
    pub fn contains(&self, key: &V::Key) -> bool {
        self.slots.lock().contains_key(key)
    }

    /// Number of resident entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

fn log_failure<V: Entity>(operation: &str, key: &V::Key, err: &DataError) {
    warn!(kind = V::KIND, key = %key, operation, "backing store call failed: {err}");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::model::Item;

    /// In-memory adapter counting calls.
    #[derive(Default)]
    struct Backend {
        items: Mutex<HashMap<u32, Item>>,
        retrieves: AtomicUsize,
        fail_stores: AtomicBool,
    }

    fn storage(backend: &Arc<Backend>) -> Storage<Item> {
        let retrieve = Arc::clone(backend);
        let store = Arc::clone(backend);
        let delete = Arc::clone(backend);
        Storage::new(StorageAdapter::new(
            move |uid: &u32| {
                retrieve.retrieves.fetch_add(1, Ordering::SeqCst);
                retrieve.items.lock().get(uid).cloned().ok_or(DataError::NotFound {
                    kind: "item",
                    key: uid.to_string(),
                })
            },
            move |uid: &u32, item: &Item| {
                if store.fail_stores.load(Ordering::SeqCst) {
                    return Err(DataError::Backend("disk full".to_owned()));
                }
                store.items.lock().insert(*uid, item.clone());
                Ok(())
            },
            move |uid: &u32| {
                delete.items.lock().remove(uid);
                Ok(())
            },
        ))
    }

    fn seeded() -> Arc<Backend> {
        let backend = Arc::new(Backend::default());
        for uid in 1..=3 {
            backend.items.lock().insert(uid, Item { uid, tid: 40_000, count: 1, expires_at: 0 });
        }
        backend
    }

    #[test]
    fn test_cache_then_hit() {
        let backend = seeded();
        let storage = storage(&backend);

        let first = storage.get(&1).unwrap();
        let second = storage.get(&1).unwrap();
        assert_eq!(backend.retrieves.load(Ordering::SeqCst), 1);
        assert_eq!(storage.len(), 1);

        first.mutable(|item| item.count = 9).unwrap();
        assert_eq!(second.immutable(|item| item.count).unwrap(), 9);
    }

    #[test]
    fn test_sentinel_and_missing() {
        let backend = seeded();
        let storage = storage(&backend);

        assert!(storage.get(&0).is_none());
        assert_eq!(backend.retrieves.load(Ordering::SeqCst), 0);

        assert!(storage.get(&77).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_lookup_tells_missing_from_failure() {
        let backend = seeded();
        let storage: Storage<Item> = Storage::new(StorageAdapter::new(
            {
                let backend = Arc::clone(&backend);
                move |uid: &u32| {
                    if *uid == 2 {
                        return Err(DataError::Backend("timeout".to_owned()));
                    }
                    backend.items.lock().get(uid).cloned().ok_or(DataError::NotFound {
                        kind: "item",
                        key: uid.to_string(),
                    })
                }
            },
            |_: &u32, _: &Item| Ok(()),
            |_: &u32| Ok(()),
        ));

        assert!(storage.lookup(&1).unwrap().is_some());
        assert!(storage.lookup(&77).unwrap().is_none());
        assert!(storage.lookup(&0).unwrap().is_none());
        assert_eq!(
            storage.lookup(&2).map(|record| record.is_some()),
            Err(DataError::Backend("timeout".to_owned()))
        );
        assert!(storage.get(&2).is_none());
    }

    #[test]
    fn test_get_many_all_or_nothing() {
        let backend = seeded();
        let storage = storage(&backend);

        assert_eq!(storage.get_many(&[1, 2, 3]).map(|records| records.len()), Some(3));
        assert!(storage.get_many(&[1, 99]).is_none());
        assert!(storage.get_many(&[]).is_some_and(|records| records.is_empty()));
    }

    #[test]
    fn test_create_and_flush() {
        let backend = seeded();
        let storage = storage(&backend);

        let record = storage
            .create(|| Ok((10, Item { uid: 10, tid: 1, count: 5, expires_at: 0 })))
            .unwrap();
        assert!(record.is_available());
        assert!(backend.items.lock().get(&10).is_none());

        assert_eq!(storage.tick(), FlushStats { flushed: 1, failed: 0 });
        assert_eq!(backend.items.lock().get(&10).map(|item| item.count), Some(5));

        // Nothing dirty left.
        assert_eq!(storage.tick(), FlushStats::default());
    }

    #[test]
    fn test_create_rejects_resident_key() {
        let backend = seeded();
        let storage = storage(&backend);
        let _resident = storage.get(&1).unwrap();

        assert!(storage.create(|| Ok((1, Item::default()))).is_none());
        assert!(storage.create(|| Ok((0, Item::default()))).is_none());
        assert!(storage
            .create(|| Err(DataError::UidExhausted("item")))
            .is_none());
    }

    #[test]
    fn test_failed_flush_stays_dirty() {
        let backend = seeded();
        let storage = storage(&backend);
        let record = storage.get(&2).unwrap();
        record.mutable(|item| item.count = 50).unwrap();

        backend.fail_stores.store(true, Ordering::SeqCst);
        assert_eq!(storage.tick(), FlushStats { flushed: 0, failed: 1 });
        assert_eq!(backend.items.lock()[&2].count, 1);

        backend.fail_stores.store(false, Ordering::SeqCst);
        assert_eq!(storage.terminate(), FlushStats { flushed: 1, failed: 0 });
        assert_eq!(backend.items.lock()[&2].count, 50);
    }

    #[test]
    fn test_delete_and_evict_invalidate_records() {
        let backend = seeded();
        let storage = storage(&backend);

        let deleted = storage.get(&1).unwrap();
        assert!(storage.delete(&1));
        assert!(!deleted.is_available());
        assert!(backend.items.lock().get(&1).is_none());

        let evicted = storage.get(&2).unwrap();
        assert!(storage.evict(&2));
        assert!(!evicted.is_available());
        assert!(!storage.contains(&2));
        // Evicting leaves the backing store alone.
        assert!(storage.get(&2).is_some());

        let dirty = storage.get(&3).unwrap();
        dirty.mutable(|item| item.count += 1).unwrap();
        assert!(!storage.evict(&3));
        assert!(dirty.is_available());
    }

    #[test]
    fn test_evict_keeps_entity_under_write() {
        let backend = seeded();
        let storage = storage(&backend);
        let record = storage.get(&1).unwrap();
        let writing = Arc::new(Barrier::new(2));

        let writer = {
            let writing = Arc::clone(&writing);
            thread::spawn(move || {
                record.mutable(|item| {
                    writing.wait();
                    thread::sleep(Duration::from_millis(100));
                    item.count = 99;
                })
            })
        };

        writing.wait();
        assert!(!storage.evict(&1));
        writer.join().unwrap().unwrap();

        assert_eq!(storage.tick(), FlushStats { flushed: 1, failed: 0 });
        assert_eq!(backend.items.lock()[&1].count, 99);
        assert!(storage.evict(&1));
    }
}
