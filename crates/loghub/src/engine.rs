//! Storage engine selection

use std::sync::Arc;

use anyhow::{Context, Result};
use loghub_config::{Config, EngineKind};
use loghub_pipeline::Ingestor;
use loghub_store::{KvEngine, MESSAGE_SEQUENCE, MemoryEngine, Sequence, SqliteEngine, ValueCodec};
use tracing::info;

/// An open engine with its record sequence
pub struct Store {
    pub engine: Arc<dyn KvEngine>,
    pub sequence: Arc<Sequence>,
}

impl Store {
    /// Start an ingestor writing to this store
    ///
    /// The ingestor owns shutdown from here on: closing it closes the engine.
    pub fn start_ingestor(&self, config: &Config) -> Ingestor {
        Ingestor::start(
            Arc::clone(&self.engine),
            Arc::clone(&self.sequence),
            &config.ingest,
            ValueCodec::new(config.store.compression_threshold),
        )
    }
}

/// Open the engine named by `[store]`
pub fn open_store(config: &Config) -> Result<Store> {
    let store = &config.store;
    let engine: Arc<dyn KvEngine> = match store.engine {
        EngineKind::Memory => Arc::new(MemoryEngine::new()),
        EngineKind::Sqlite => Arc::new(
            SqliteEngine::open(&store.path)
                .with_context(|| format!("failed to open store at {}", store.path.display()))?,
        ),
    };
    info!(
        engine = engine.name(),
        path = %store.path.display(),
        "store opened"
    );

    let sequence = Arc::new(Sequence::new(
        Arc::clone(&engine),
        MESSAGE_SEQUENCE,
        store.sequence_bandwidth,
    ));
    Ok(Store { engine, sequence })
}
