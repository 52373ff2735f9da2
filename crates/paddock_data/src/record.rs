//! # Records
//!
//! A [`Record`] is the only way to touch a cached entity.
//!
//! ## Design
//!
//! ```text
//! Storage map ──owns──► Arc<Slot> ◄──weak── Record ── immutable() ─► RwLock::read
//!                                                  └─ mutable()   ─► RwLock::write + dirty
//! ```
//!
//! - The storage owns every slot; records hold a `Weak`, so an evicted or
//!   deleted entity makes outstanding records unavailable instead of
//!   dangling
//! - Locks are held only for the duration of the caller's closure
//! - `mutable` marks the slot dirty while still holding the write lock, so
//!   a concurrent flush either sees the new value or the dirty flag
//! - A slot is retired under its write lock when it leaves the storage;
//!   records that already upgraded their handle see the flag and refuse

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::{DataError, DataResult};
use crate::model::Entity;

/// Storage cell of one resident entity.
#[derive(Debug)]
pub(crate) struct Slot<V> {
    pub(crate) value: RwLock<V>,
    dirty: AtomicBool,
    retired: AtomicBool,
}

impl<V> Slot<V> {
    /// Creates a slot. Freshly created entities start dirty.
    pub(crate) fn new(value: V, dirty: bool) -> Self {
        Self {
            value: RwLock::new(value),
            dirty: AtomicBool::new(dirty),
            retired: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, V> {
        self.value.read()
    }

    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clears the dirty flag, returning its previous value.
    #[inline]
    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Marks the slot as no longer owned by a storage.
    #[inline]
    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

/// Access capability for one entity.
///
/// Either bound to a live slot or unavailable. Records are move-only and
/// never keep an entity resident.
#[derive(Debug)]
pub struct Record<V: Entity> {
    key: V::Key,
    slot: Option<Weak<Slot<V>>>,
}

impl<V: Entity> Record<V> {
    /// A record bound to `slot`.
    pub(crate) fn bound(key: V::Key, slot: &Arc<Slot<V>>) -> Self {
        Self {
            key,
            slot: Some(Arc::downgrade(slot)),
        }
    }

    /// The "not found" record.
    #[must_use]
    pub fn unavailable(key: V::Key) -> Self {
        Self { key, slot: None }
    }

    /// Whether the entity can be accessed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.slot
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|slot| !slot.is_retired())
    }

    /// Entity kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        V::KIND
    }

    /// Entity key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &V::Key {
        &self.key
    }

    /// Runs `consumer` with shared access to the entity.
    ///
    /// # Errors
    ///
    /// [`DataError::Unavailable`] if the record is not bound to a live slot.
    pub fn immutable<R>(&self, consumer: impl FnOnce(&V) -> R) -> DataResult<R> {
        let slot = self.upgrade()?;
        let guard = slot.read();
        if slot.is_retired() {
            return Err(self.unavailable_error());
        }
        Ok(consumer(&*guard))
    }

    /// Runs `consumer` with exclusive access to the entity and marks it
    /// dirty.
    ///
    /// The consumer must not change the entity's key.
    ///
    /// # Errors
    ///
    /// [`DataError::Unavailable`] if the record is not bound to a live slot.
    pub fn mutable<R>(&self, consumer: impl FnOnce(&mut V) -> R) -> DataResult<R> {
        let slot = self.upgrade()?;
        let mut guard = slot.value.write();
        if slot.is_retired() {
            return Err(self.unavailable_error());
        }
        let result = consumer(&mut *guard);
        slot.mark_dirty();
        drop(guard);
        Ok(result)
    }

    fn upgrade(&self) -> DataResult<Arc<Slot<V>>> {
        self.slot
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| self.unavailable_error())
    }

    fn unavailable_error(&self) -> DataError {
        DataError::Unavailable {
            kind: V::KIND,
            key: self.key.to_string(),
        }
    }
}
