//! Operations routes
//!
//! Health checks and ingestion counters for monitoring.

use axum::http::StatusCode;
use axum::{Json, Router, extract::State, routing::get};
use loghub_pipeline::IngestSnapshot;
use serde::Serialize;

use crate::state::AppState;

// =============================================================================
// Response Types
// =============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Storage engine name
    pub engine: &'static str,
    /// Uptime in seconds (only if server metrics available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,
}

/// Server metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub uptime_secs: u64,
    pub ingest: IngestSnapshot,
}

// =============================================================================
// Routes
// =============================================================================

/// Operations routes (health, metrics)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
///
/// Always 200 while the API is running.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        engine: state.engine.name(),
        uptime_secs: state.server_metrics.as_ref().map(|m| m.uptime_secs()),
    })
}

/// GET /metrics
///
/// Returns 503 when no ingestion pipeline is attached.
async fn metrics_handler(
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let server = state.server_metrics.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "SERVER_NOT_RUNNING",
                "message": "Ingestion metrics not available. Start with `loghub serve`."
            })),
        )
    })?;

    Ok(Json(MetricsResponse {
        uptime_secs: server.uptime_secs(),
        ingest: (server.ingest_snapshot)(),
    }))
}
