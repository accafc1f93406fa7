//! Ingestion pipeline configuration

use std::time::Duration;

use serde::Deserialize;

/// Ingestion pipeline configuration
///
/// # Example
///
/// ```toml
/// [ingest]
/// buffer_size = 1000          # default
/// flush_interval = "1s"       # default
/// reclaim_interval = "1h"     # default
/// stats_interval = "10s"      # default
/// max_ttl = "72h"             # default
/// queue_size = 64             # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Write buffer capacity; a full buffer forces a flush
    /// Default: 1000
    pub buffer_size: usize,

    /// Periodic flush interval
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// Space reclamation interval
    /// Default: 1h
    #[serde(with = "humantime_serde")]
    pub reclaim_interval: Duration,

    /// Throughput statistics interval
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub stats_interval: Duration,

    /// Upper bound (and default) for per-event `ttl` tags
    /// Default: 72h
    #[serde(with = "humantime_serde")]
    pub max_ttl: Duration,

    /// Pending event batches accepted before senders wait
    /// Default: 64
    pub queue_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            flush_interval: Duration::from_secs(1),
            reclaim_interval: Duration::from_secs(3600),
            stats_interval: Duration::from_secs(10),
            max_ttl: Duration::from_secs(72 * 3600),
            queue_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: IngestConfig = toml::from_str("").unwrap();
        assert_eq!(config.buffer_size, 1000);
        assert_eq!(config.flush_interval, Duration::from_secs(1));
        assert_eq!(config.reclaim_interval, Duration::from_secs(3600));
        assert_eq!(config.stats_interval, Duration::from_secs(10));
        assert_eq!(config.max_ttl, Duration::from_secs(259_200));
        assert_eq!(config.queue_size, 64);
    }

    #[test]
    fn test_humantime_durations() {
        let toml = r#"
flush_interval = "250ms"
reclaim_interval = "30m"
max_ttl = "2days"
"#;
        let config: IngestConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.flush_interval, Duration::from_millis(250));
        assert_eq!(config.reclaim_interval, Duration::from_secs(1800));
        assert_eq!(config.max_ttl, Duration::from_secs(172_800));
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(toml::from_str::<IngestConfig>("flush_interval = \"soon\"").is_err());
    }
}
