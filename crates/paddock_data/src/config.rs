//! # Director Configuration
//!
//! Loaded once at startup from the `[data]` table of the server's TOML file
//! and injected into the [`crate::DataDirector`].
//!
//! ```toml
//! [data]
//! backend = "file"
//! data_path = "./data"
//! load_timeout_secs = 10
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::source::{DataSource, FileDataSource, MemoryDataSource};

/// Default deadline of a load attempt chain.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 10;

/// Which backing store to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Nothing survives a restart.
    #[default]
    Memory,
    /// JSON files under `data_path`.
    File,
}

/// Data director settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Backing store.
    pub backend: Backend,
    /// Root directory of the file backend.
    pub data_path: PathBuf,
    /// Deadline of a load attempt chain, in seconds.
    pub load_timeout_secs: u64,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            data_path: PathBuf::from("data"),
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl DirectorConfig {
    /// Parses a standalone TOML document.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidConfig`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> DataResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| DataError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> DataResult<()> {
        if self.load_timeout_secs == 0 {
            return Err(DataError::InvalidConfig(
                "load_timeout_secs must be at least 1".to_owned(),
            ));
        }
        if self.backend == Backend::File && self.data_path.as_os_str().is_empty() {
            return Err(DataError::InvalidConfig(
                "data_path is required by the file backend".to_owned(),
            ));
        }
        Ok(())
    }

    /// Deadline of a load attempt chain.
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Opens the configured backing store.
    ///
    /// # Errors
    ///
    /// Fails if the file backend cannot open its directory.
    pub fn open_source(&self) -> DataResult<Arc<dyn DataSource>> {
        let source: Arc<dyn DataSource> = match self.backend {
            Backend::Memory => Arc::new(MemoryDataSource::new()),
            Backend::File => Arc::new(FileDataSource::open(&self.data_path)?),
        };
        Ok(source)
    }
}
