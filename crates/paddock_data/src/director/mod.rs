//! # Data Director
//!
//! Owns one [`Storage`] per entity kind plus the [`Scheduler`] that drives
//! the load graphs.
//!
//! ## Design
//!
//! ```text
//!                 ┌──────────────── DataDirector ────────────────┐
//! request_load ──►│ contexts ──► LoadAttempt ──► Scheduler        │
//!                 │                  │                            │
//! get / create ──►│ DataStores { users, characters, horses, ... } │──► DataSource
//!                 └───────────────────────────────────────────────┘
//! tick(): flush every storage, then run the scheduled attempts
//! ```
//!
//! The director is driven by one thread. Records it hands out may be used
//! from any thread.

mod context;
mod load;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

pub use context::{LoadState, UserDataContext};

use crate::config::DirectorConfig;
use crate::error::DataResult;
use crate::model::{
    Character, Egg, Entity, EntityKey, Guild, Horse, Housing, Infraction, Item, Mail, Pet,
    Settings, Stallion, StorageItem, Uid, User,
};
use crate::record::Record;
use crate::scheduler::Scheduler;
use crate::source::DataSource;
use crate::storage::{FlushStats, Storage, StorageAdapter};
use load::LoadScope;

/// Access to the storage of one entity kind.
pub trait HasStorage<V: Entity> {
    /// The storage of `V`.
    fn storage(&self) -> &Storage<V>;
}

macro_rules! data_stores {
    ($($field:ident: $entity:ty),* $(,)?) => {
        /// One storage per entity kind.
        pub struct DataStores {
            $(
                #[doc = concat!("Resident `", stringify!($entity), "` entities.")]
                pub $field: Storage<$entity>,
            )*
        }

        impl DataStores {
            /// Creates empty storages backed by `source`.
            #[must_use]
            pub fn new(source: &Arc<dyn DataSource>) -> Self {
                Self {
                    $( $field: Storage::new(StorageAdapter::from_source(source)), )*
                }
            }

            /// Flushes every storage.
            pub fn tick(&self) -> FlushStats {
                let mut stats = FlushStats::default();
                $( stats.merge(self.$field.tick()); )*
                stats
            }

            /// Final flush of every storage.
            pub fn terminate(&self) -> FlushStats {
                let mut stats = FlushStats::default();
                $( stats.merge(self.$field.terminate()); )*
                stats
            }

            /// Resident entities across all kinds.
            #[must_use]
            pub fn resident(&self) -> usize {
                0 $( + self.$field.len() )*
            }
        }

        $(
            impl HasStorage<$entity> for DataStores {
                #[inline]
                fn storage(&self) -> &Storage<$entity> {
                    &self.$field
                }
            }
        )*
    };
}

data_stores!(
    users: User,
    infractions: Infraction,
    characters: Character,
    horses: Horse,
    items: Item,
    storage_items: StorageItem,
    eggs: Egg,
    pets: Pet,
    housing: Housing,
    guilds: Guild,
    stallions: Stallion,
    mail: Mail,
    settings: Settings,
);

/// Entry point to the authoritative game state.
pub struct DataDirector {
    stores: Arc<DataStores>,
    scheduler: Scheduler,
    contexts: HashMap<String, Arc<UserDataContext>>,
    source: Arc<dyn DataSource>,
    load_timeout: Duration,
}

impl DataDirector {
    /// Creates a director over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>, config: &DirectorConfig) -> Self {
        Self {
            stores: Arc::new(DataStores::new(&source)),
            scheduler: Scheduler::new(),
            contexts: HashMap::new(),
            source,
            load_timeout: config.load_timeout(),
        }
    }

    /// Validates `config` and opens its backing store.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a backing store that cannot be opened.
    pub fn from_config(config: &DirectorConfig) -> DataResult<Self> {
        config.validate()?;
        let source = config.open_source()?;
        info!(backend = ?config.backend, "data director initialized");
        Ok(Self::new(source, config))
    }

    /// Overrides the deadline of future load chains.
    pub fn set_load_timeout(&mut self, timeout: Duration) {
        self.load_timeout = timeout;
    }

    /// The storages.
    #[must_use]
    pub fn stores(&self) -> &DataStores {
        &self.stores
    }

    /// Tasks waiting for the next tick.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Record of the entity stored under `key`; unavailable if it cannot
    /// be loaded. The sentinel key never reaches the backing store.
    #[must_use]
    pub fn get<V: Entity>(&self, key: &V::Key) -> Record<V>
    where
        DataStores: HasStorage<V>,
    {
        self.storage::<V>()
            .get(key)
            .unwrap_or_else(|| Record::unavailable(key.clone()))
    }

    /// Records for every key, or `None` if any one is unavailable.
    #[must_use]
    pub fn get_many<V: Entity>(&self, keys: &[V::Key]) -> Option<Vec<Record<V>>>
    where
        DataStores: HasStorage<V>,
    {
        self.storage::<V>().get_many(keys)
    }

    /// Creates a default entity under a fresh uid.
    #[must_use]
    pub fn create<V: Entity<Key = Uid>>(&self) -> Record<V>
    where
        DataStores: HasStorage<V>,
    {
        let source = &self.source;
        self.storage::<V>()
            .create(|| {
                let uid = source.next_uid(V::KIND)?;
                let mut value = V::default();
                value.set_key(uid);
                Ok((uid, value))
            })
            .unwrap_or_else(|| Record::unavailable(Uid::default()))
    }

    /// Creates a user account.
    ///
    /// Unavailable if the name is taken or the backing store cannot tell
    /// whether it is.
    #[must_use]
    pub fn create_user(&self, name: &str) -> Record<User> {
        let name = name.to_owned();
        let users = &self.stores.users;
        match users.lookup(&name) {
            Ok(None) => {}
            Ok(Some(_)) => {
                warn!(user = %name, "user already exists");
                return Record::unavailable(name);
            }
            Err(err) => {
                warn!(user = %name, "cannot check whether the user exists: {err}");
                return Record::unavailable(name);
            }
        }
        users
            .create(|| {
                let user = User {
                    name: name.clone(),
                    ..User::default()
                };
                Ok((name.clone(), user))
            })
            .unwrap_or_else(|| Record::unavailable(name.clone()))
    }

    /// Removes an entity from the cache and the backing store.
    pub fn delete<V: Entity>(&self, key: &V::Key) -> bool
    where
        DataStores: HasStorage<V>,
    {
        !key.is_sentinel() && self.storage::<V>().delete(key)
    }

    /// Starts loading the user and its infractions.
    ///
    /// No-op while a load is in flight or once the user data is resident.
    pub fn request_load_user_data(&mut self, name: &str) {
        let context = self.context(name);
        if context.is_user_data_loaded() {
            return;
        }
        load::start(
            &mut self.scheduler,
            LoadScope::User,
            context,
            Arc::clone(&self.stores),
            self.load_timeout,
        );
    }

    /// Starts loading the character graph of `name`.
    ///
    /// No-op while a load is in flight or once the character data is
    /// resident.
    pub fn request_load_character_data(&mut self, name: &str, character_uid: Uid) {
        let context = self.context(name);
        if context.is_character_data_loaded() {
            return;
        }
        load::start(
            &mut self.scheduler,
            LoadScope::Character(character_uid),
            context,
            Arc::clone(&self.stores),
            self.load_timeout,
        );
    }

    /// Whether a load chain of `name` is in flight.
    #[must_use]
    pub fn are_data_being_loaded(&self, name: &str) -> bool {
        self.contexts
            .get(name)
            .is_some_and(|context| context.is_being_loaded())
    }

    /// Whether the user data of `name` is resident.
    #[must_use]
    pub fn are_user_data_loaded(&self, name: &str) -> bool {
        self.contexts
            .get(name)
            .is_some_and(|context| context.is_user_data_loaded())
    }

    /// Whether the character graph of `name` is resident.
    #[must_use]
    pub fn are_character_data_loaded(&self, name: &str) -> bool {
        self.contexts
            .get(name)
            .is_some_and(|context| context.is_character_data_loaded())
    }

    /// State of the latest load chain of `name`.
    #[must_use]
    pub fn load_state(&self, name: &str) -> Option<LoadState> {
        self.contexts.get(name).map(|context| context.state())
    }

    /// Why the latest attempt for `name` did not complete.
    #[must_use]
    pub fn last_debug_message(&self, name: &str) -> Option<String> {
        self.contexts.get(name).map(|context| context.debug_message())
    }

    /// Drops the bookkeeping of an idle user. Returns whether it was dropped.
    pub fn forget_user(&mut self, name: &str) -> bool {
        let idle = self
            .contexts
            .get(name)
            .is_some_and(|context| !context.is_being_loaded());
        if idle {
            self.contexts.remove(name);
        }
        idle
    }

    /// Flushes dirty entities, then runs the scheduled load attempts.
    pub fn tick(&mut self) -> FlushStats {
        let stats = self.stores.tick();
        if stats.failed > 0 {
            warn!(failed = stats.failed, "entities failed to flush, retrying next tick");
        }
        self.scheduler.tick();
        stats
    }

    /// Final flush, then releases the backing store.
    ///
    /// # Errors
    ///
    /// The backing store failed to terminate.
    pub fn terminate(&mut self) -> DataResult<FlushStats> {
        let stats = self.stores.terminate();
        self.scheduler.terminate();
        info!(
            flushed = stats.flushed,
            failed = stats.failed,
            "data director terminated"
        );
        self.source.terminate().map_err(|err| {
            warn!("backing store failed to terminate: {err}");
            err
        })?;
        Ok(stats)
    }

    fn storage<V: Entity>(&self) -> &Storage<V>
    where
        DataStores: HasStorage<V>,
    {
        HasStorage::<V>::storage(&*self.stores)
    }

    fn context(&mut self, name: &str) -> Arc<UserDataContext> {
        let context = self.contexts.entry(name.to_owned()).or_insert_with(|| {
            debug!(user = name, "created user data context");
            Arc::new(UserDataContext::new(name))
        });
        Arc::clone(context)
    }
}

impl std::fmt::Debug for DataDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataDirector")
            .field("resident", &self.stores.resident())
            .field("contexts", &self.contexts.len())
            .field("pending_tasks", &self.scheduler.pending())
            .finish_non_exhaustive()
    }
}
