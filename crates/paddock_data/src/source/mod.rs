//! # Backing Stores
//!
//! The contract between the entity caches and durable storage.
//!
//! A data source persists every entity kind and hands out uids. Calls are
//! synchronous and come from one thread at a time (the director thread),
//! but implementations must still be `Send + Sync` since adapters share them.
//!
//! | source | use |
//! |---|---|
//! | [`MemoryDataSource`] | tests, throwaway servers |
//! | [`FileDataSource`] | one JSON file per entity on local disk |

mod file;
mod memory;

pub use file::FileDataSource;
pub use memory::MemoryDataSource;

use crate::error::DataResult;
use crate::model::{
    Character, Egg, Entity, Guild, Horse, Housing, Infraction, Item, Mail, Pet, Settings,
    Stallion, StorageItem, Uid, User,
};

/// Persistence of one entity kind.
pub trait EntitySource<V: Entity>: Send + Sync {
    /// Loads the entity stored under `key`.
    ///
    /// # Errors
    ///
    /// [`crate::DataError::NotFound`] if nothing is stored under `key`, or a
    /// backend/serialization error.
    fn retrieve(&self, key: &V::Key) -> DataResult<V>;

    /// Persists `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Backend or serialization failure.
    fn store(&self, key: &V::Key, value: &V) -> DataResult<()>;

    /// Removes the entity stored under `key`. Removing nothing is not an error.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn delete(&self, key: &V::Key) -> DataResult<()>;
}

/// A backing store for every entity kind.
pub trait DataSource:
    EntitySource<User>
    + EntitySource<Infraction>
    + EntitySource<Character>
    + EntitySource<Horse>
    + EntitySource<Item>
    + EntitySource<StorageItem>
    + EntitySource<Egg>
    + EntitySource<Pet>
    + EntitySource<Housing>
    + EntitySource<Guild>
    + EntitySource<Stallion>
    + EntitySource<Mail>
    + EntitySource<Settings>
{
    /// Allocates a fresh uid for `kind`. Never returns
    /// [`crate::model::INVALID_UID`].
    ///
    /// # Errors
    ///
    /// [`crate::DataError::UidExhausted`] or a backend failure.
    fn next_uid(&self, kind: &'static str) -> DataResult<Uid>;

    /// Releases the source. Called once after the final flush.
    ///
    /// # Errors
    ///
    /// Backend failure while syncing.
    fn terminate(&self) -> DataResult<()> {
        Ok(())
    }
}
