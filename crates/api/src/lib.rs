//! loghub API
//!
//! HTTP API over stored frames, built on Axum.
//!
//! # Usage
//!
//! ```ignore
//! use loghub_api::{build_router, AppState};
//!
//! let app = build_router(AppState::new(engine));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:6001").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! - `GET /api/query` - raw frames (`simNo`, `since`, `until`, `msgIds`, `msgXfer`)
//! - `GET /api/query/body` - decoded bodies (`simNo`, `since`, `until`, `msgId`, `ds`, `extIds`)
//! - `GET /health` - liveness
//! - `GET /metrics` - ingestion counters, when served alongside the pipeline
//!
//! Times are `YYYY-MM-DD HH:MM:SS` in UTC. Successful responses are wrapped as
//! `{"error": null, "result": ...}`; failures are `{"error": CODE, "message": ...}`.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::{AppState, ServerMetrics};
