//! API routes

pub mod ops;
pub mod query;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (health, metrics)
        .merge(ops::routes())
        // Frame queries
        .merge(query::routes())
        .with_state(state)
}
