//! Application state
//!
//! Shared state for API handlers: the storage engine queries read from and,
//! when running alongside ingestion, the pipeline's counters.

use std::sync::Arc;
use std::time::Instant;

use loghub_pipeline::IngestSnapshot;
use loghub_store::KvEngine;

/// Ingestion handles exposed on `/metrics`
///
/// Populated by `loghub serve`; absent when only the query API runs.
pub struct ServerMetrics {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Pipeline counters snapshot function
    pub ingest_snapshot: Box<dyn Fn() -> IngestSnapshot + Send + Sync>,
}

impl ServerMetrics {
    pub fn new(ingest_snapshot: Box<dyn Fn() -> IngestSnapshot + Send + Sync>) -> Self {
        Self {
            start_time: Instant::now(),
            ingest_snapshot,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn KvEngine>,
    pub server_metrics: Option<Arc<ServerMetrics>>,
}

impl AppState {
    pub fn new(engine: Arc<dyn KvEngine>) -> Self {
        Self {
            engine,
            server_metrics: None,
        }
    }

    pub fn with_server_metrics(mut self, metrics: ServerMetrics) -> Self {
        self.server_metrics = Some(Arc::new(metrics));
        self
    }
}
