//! Storage configuration

use std::path::PathBuf;

use serde::Deserialize;

/// Storage engine selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// SQLite database file (default)
    #[default]
    Sqlite,
    /// In-process map, lost on exit
    Memory,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// Storage configuration
///
/// # Example
///
/// ```toml
/// [store]
/// engine = "sqlite"              # default
/// path = "data/loghub.db"        # default
/// compression_threshold = 256    # default
/// sequence_bandwidth = 10000     # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage engine
    /// Default: sqlite
    pub engine: EngineKind,

    /// Database file for the sqlite engine
    /// Default: "data/loghub.db"
    pub path: PathBuf,

    /// Frames larger than this many bytes are stored LZ4-compressed
    /// Default: 256
    pub compression_threshold: usize,

    /// Sequence numbers leased from the store per round trip
    /// Default: 10000
    pub sequence_bandwidth: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Sqlite,
            path: PathBuf::from("data/loghub.db"),
            compression_threshold: 256,
            sequence_bandwidth: 10_000,
        }
    }
}
