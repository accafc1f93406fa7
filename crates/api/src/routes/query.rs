//! Frame query routes
//!
//! - `GET /api/query` - raw frames of one device in a time window
//! - `GET /api/query/body` - decoded bodies of one message id, split messages
//!   reassembled

use std::time::Instant;

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use loghub_query::{
    BodyQuery, DecodedBody, DirectionFilter, ExtensionFilter, MessageIdFilter, RawQuery,
    RawResult, query_body, query_raw,
};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ApiResponse, BodyParams, RawParams};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/query", get(raw_handler))
        .route("/api/query/body", get(body_handler))
}

/// Run a blocking query off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> loghub_query::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("query task failed: {e}")))?
        .map_err(ApiError::from)
}

/// GET /api/query
///
/// Params: `simNo`, `since`, `until` (required), `msgIds`, `msgXfer`.
async fn raw_handler(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> Result<Json<ApiResponse<RawResult>>> {
    let window = params.window.resolve()?;
    let query = RawQuery::new(window.device_id, window.since, window.until)
        .with_message_ids(MessageIdFilter::parse(params.msg_ids.as_deref().unwrap_or_default()))
        .with_directions(DirectionFilter::parse(params.msg_xfer.as_deref().unwrap_or_default()));

    let started = Instant::now();
    let engine = state.engine.clone();
    let result = run_blocking(move || query_raw(engine.as_ref(), &query)).await?;
    debug!(
        msgs = result.msgs.len(),
        elapsed = ?started.elapsed(),
        "raw query"
    );
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/query/body
///
/// Params: `simNo`, `since`, `until`, `msgId` (required), `ds`, `extIds`.
async fn body_handler(
    State(state): State<AppState>,
    Query(params): Query<BodyParams>,
) -> Result<Json<ApiResponse<Vec<DecodedBody>>>> {
    let window = params.window.resolve()?;
    let mut query = BodyQuery::new(
        window.device_id,
        window.since,
        window.until,
        params.message_id()?,
    )
    .with_extension_ids(ExtensionFilter::parse(params.ext_ids.as_deref().unwrap_or_default()));
    if let Some(ds) = params.data_source()? {
        query = query.with_data_source(ds);
    }

    let started = Instant::now();
    let engine = state.engine.clone();
    let bodies = run_blocking(move || query_body(engine.as_ref(), &query)).await?;
    debug!(
        bodies = bodies.len(),
        elapsed = ?started.elapsed(),
        "body query"
    );
    Ok(Json(ApiResponse::ok(bodies)))
}
