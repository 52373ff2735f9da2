//! Logging setup.
//!
//! `RUST_LOG` overrides the level chosen from the command line.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Args;

/// Installs the global subscriber.
///
/// # Errors
///
/// A global subscriber is already installed.
pub fn setup_logging(args: &Args, json_format: bool) -> Result<()> {
    let level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json_format {
        registry.with(fmt::layer().json().with_target(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
    installed.map_err(|err| anyhow!("failed to initialize logging: {err}"))
}
