//! # PADDOCK - Game Server Host
//!
//! Process around the [`paddock_data::DataDirector`]: configuration,
//! logging, the fixed-rate tick loop and graceful shutdown.
//!
//! ```text
//! paddock --config paddock.toml
//!   load config ─► setup logging ─► open backing store
//!   every tick:    flush dirty entities, run load attempts
//!   on Ctrl-C:     final flush, release backing store
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod server;
pub mod tick;

pub use config::{load_config, Args, ConfigOrigin, ServerConfig};
pub use server::PaddockServer;
pub use tick::{TickLoop, TickStats};
