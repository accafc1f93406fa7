//! Configuration validation
//!
//! Rejects values the pipeline cannot run with:
//! - zero-sized buffers and queues
//! - zero intervals and TTLs
//! - a sqlite engine without a path

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::store::EngineKind;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_store(config)?;
    validate_ingest(config)?;
    Ok(())
}

fn validate_store(config: &Config) -> Result<()> {
    let store = &config.store;

    if store.sequence_bandwidth == 0 {
        return Err(ConfigError::invalid_value(
            "store",
            "sequence_bandwidth",
            "must be greater than 0",
        ));
    }

    if store.engine == EngineKind::Sqlite && store.path.as_os_str().is_empty() {
        return Err(ConfigError::invalid_value(
            "store",
            "path",
            "required for the sqlite engine",
        ));
    }

    Ok(())
}

fn validate_ingest(config: &Config) -> Result<()> {
    let ingest = &config.ingest;

    if ingest.buffer_size == 0 {
        return Err(ConfigError::invalid_value(
            "ingest",
            "buffer_size",
            "must be greater than 0",
        ));
    }

    if ingest.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "ingest",
            "queue_size",
            "must be greater than 0",
        ));
    }

    for (field, value) in [
        ("flush_interval", ingest.flush_interval),
        ("reclaim_interval", ingest.reclaim_interval),
        ("stats_interval", ingest.stats_interval),
        ("max_ttl", ingest.max_ttl),
    ] {
        if value == Duration::ZERO {
            return Err(ConfigError::invalid_value(
                "ingest",
                field,
                "must be greater than 0",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn invalid_field(toml: &str) -> &'static str {
        match Config::from_str(toml) {
            Err(ConfigError::InvalidValue { field, .. }) => field,
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_buffer_size() {
        assert_eq!(invalid_field("[ingest]\nbuffer_size = 0"), "buffer_size");
    }

    #[test]
    fn test_zero_queue_size() {
        assert_eq!(invalid_field("[ingest]\nqueue_size = 0"), "queue_size");
    }

    #[test]
    fn test_zero_bandwidth() {
        assert_eq!(
            invalid_field("[store]\nsequence_bandwidth = 0"),
            "sequence_bandwidth"
        );
    }

    #[test]
    fn test_zero_interval() {
        assert_eq!(invalid_field("[ingest]\nflush_interval = \"0s\""), "flush_interval");
        assert_eq!(invalid_field("[ingest]\nmax_ttl = \"0s\""), "max_ttl");
    }

    #[test]
    fn test_sqlite_requires_path() {
        assert_eq!(invalid_field("[store]\npath = \"\""), "path");
    }

    #[test]
    fn test_memory_engine_ignores_path() {
        assert!(Config::from_str("[store]\nengine = \"memory\"\npath = \"\"").is_ok());
    }
}
