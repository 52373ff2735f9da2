//! # PADDOCK Data - The Authoritative Game State
//!
//! In-memory cache of every persistent game entity, with lock-guarded
//! access and tick-driven synchronization to a backing store.
//!
//! ## Architecture
//!
//! - **Model**: users, characters, horses, items and the rest, as plain values
//! - **Record**: shared/exclusive access to one cached entity
//! - **Storage**: per-kind cache with dirty tracking
//! - **Scheduler**: FIFO tasks run once per tick
//! - **Director**: owns the storages and drives the load graphs
//! - **Source**: the backing-store contract (memory, JSON files)
//!
//! ## Access Model
//!
//! ```text
//! CONNECTION THREADS                  DIRECTOR THREAD
//!   |                                    |
//!   |--- record.immutable(|horse| ..) -->| per-entity RwLock
//!   |--- record.mutable(|horse| ..) ---->| marks dirty
//!   |                                    |-- tick(): flush dirty, run loads
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use paddock_data::{DataDirector, DirectorConfig, model::Horse};
//!
//! let mut director = DataDirector::from_config(&DirectorConfig::default())?;
//! let horse = director.create::<Horse>();
//! horse.mutable(|horse| horse.name = "Ace".to_owned())?;
//! director.tick(); // persisted
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod director;
pub mod error;
pub mod model;
pub mod record;
pub mod scheduler;
pub mod source;
pub mod storage;
pub mod wire;

pub use config::{Backend, DirectorConfig};
pub use director::{DataDirector, DataStores, HasStorage, LoadState, UserDataContext};
pub use error::{DataError, DataResult};
pub use record::Record;
pub use scheduler::Scheduler;
pub use source::{DataSource, EntitySource, FileDataSource, MemoryDataSource};
pub use storage::{FlushStats, Storage, StorageAdapter};
