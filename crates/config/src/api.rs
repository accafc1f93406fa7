//! HTTP query API configuration

use std::net::SocketAddr;

use serde::Deserialize;

/// HTTP query API configuration
///
/// # Example
///
/// ```toml
/// [api]
/// enabled = true             # default
/// bind = "0.0.0.0:6001"      # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the query API alongside ingestion
    /// Default: true
    pub enabled: bool,

    /// Listen address
    /// Default: 0.0.0.0:6001
    pub bind: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: SocketAddr::from(([0, 0, 0, 0], 6001)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert!(config.enabled);
        assert_eq!(config.bind.to_string(), "0.0.0.0:6001");
    }

    #[test]
    fn test_deserialize() {
        let config: ApiConfig = toml::from_str("enabled = false\nbind = \"127.0.0.1:8080\"").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(toml::from_str::<ApiConfig>("bind = \"localhost\"").is_err());
    }
}
