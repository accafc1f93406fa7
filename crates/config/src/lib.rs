//! loghub Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use loghub_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[store]\nengine = \"memory\"").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//!
//! [store]
//! engine = "sqlite"
//! path = "data/loghub.db"
//! compression_threshold = 256
//! sequence_bandwidth = 10000
//!
//! [ingest]
//! buffer_size = 1000
//! flush_interval = "1s"
//! reclaim_interval = "1h"
//! stats_interval = "10s"
//! max_ttl = "72h"
//! queue_size = 64
//!
//! [api]
//! enabled = true
//! bind = "0.0.0.0:6001"
//! ```

mod api;
mod error;
mod ingest;
mod logging;
mod store;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use api::ApiConfig;
pub use error::{ConfigError, Result};
pub use ingest::IngestConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use store::{EngineKind, StoreConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Storage engine and value encoding
    pub store: StoreConfig,

    /// Ingestion buffer, schedules and TTL policy
    pub ingest: IngestConfig,

    /// HTTP query API
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load from `path` if given, otherwise defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
