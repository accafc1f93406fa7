//! Ordered shutdown of a serving process

use loghub_pipeline::Ingestor;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Stop the API, then the pipeline
///
/// The API task watches `cancel` and is awaited before the ingestor closes,
/// so queries still in flight read from an open engine.
pub async fn shutdown(
    cancel: &CancellationToken,
    api: Option<JoinHandle<()>>,
    ingestor: &Ingestor,
) {
    cancel.cancel();
    if let Some(handle) = api
        && let Err(e) = handle.await
    {
        warn!(error = %e, "API server task failed");
    }

    ingestor.close().await;
}
