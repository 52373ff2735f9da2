//! # Server Configuration
//!
//! Command-line arguments and the TOML configuration file.
//!
//! ```toml
//! tick_rate = 20
//! log_json = false
//!
//! [data]
//! backend = "file"
//! data_path = "./data"
//! load_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use paddock_data::DirectorConfig;
use serde::{Deserialize, Serialize};

/// Default director ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Command-line arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path. Created with defaults if missing.
    #[arg(short, long, default_value = "paddock.toml")]
    pub config: PathBuf,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long)]
    pub debug: bool,

    /// Run this many ticks, then shut down.
    #[arg(long)]
    pub ticks: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from("paddock.toml"),
            debug: false,
            ticks: None,
        }
    }
}

/// Root of the configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Director ticks per second.
    pub tick_rate: u32,
    /// Emit JSON log lines.
    pub log_json: bool,
    /// Data director settings.
    pub data: DirectorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            log_json: false,
            data: DirectorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("malformed configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Describes the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.tick_rate) {
            bail!("tick_rate must be between 1 and 1000, got {}", self.tick_rate);
        }
        self.data.validate()?;
        Ok(())
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from the file.
    File,
    /// The file was missing and has been created with defaults.
    CreatedDefault,
}

/// Loads the configuration file, creating it with defaults if missing.
///
/// # Errors
///
/// The file cannot be read or written, or does not parse.
pub fn load_config(path: &Path) -> Result<(ServerConfig, ConfigOrigin)> {
    if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = ServerConfig::from_toml_str(&text)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        return Ok((config, ConfigOrigin::File));
    }

    let config = ServerConfig::default();
    let text = toml::to_string_pretty(&config).context("failed to render default configuration")?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok((config, ConfigOrigin::CreatedDefault))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_data::Backend;

    #[test]
    fn test_parse_full_file() {
        let config = ServerConfig::from_toml_str(
            r#"
            tick_rate = 30
            log_json = true

            [data]
            backend = "file"
            data_path = "/srv/paddock"
            load_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.tick_rate, 30);
        assert!(config.log_json);
        assert_eq!(config.data.backend, Backend::File);
        assert_eq!(config.data.load_timeout_secs, 5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ServerConfig::from_toml_str("log_json = true").unwrap();
        assert_eq!(config.tick_rate, DEFAULT_TICK_RATE);
        assert_eq!(config.data, DirectorConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(ServerConfig::from_toml_str("tick_rate = 0").is_err());
        assert!(ServerConfig::from_toml_str("[data]\nload_timeout_secs = 0").is_err());
    }

    #[test]
    fn test_missing_file_created_with_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("paddock.toml");

        let (config, origin) = load_config(&path).unwrap();
        assert_eq!(origin, ConfigOrigin::CreatedDefault);
        assert_eq!(config, ServerConfig::default());

        let (reloaded, origin) = load_config(&path).unwrap();
        assert_eq!(origin, ConfigOrigin::File);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::parse_from(["paddock", "--config", "x.toml", "--debug", "--ticks", "3"]);
        assert_eq!(args.config, PathBuf::from("x.toml"));
        assert!(args.debug);
        assert_eq!(args.ticks, Some(3));
        assert_eq!(Args::parse_from(["paddock"]), Args::default());
    }
}
