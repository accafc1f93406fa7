//! Serve command - ingest stdin and serve the query API
//!
//! Lines read from stdin flow through the pipeline into the configured
//! engine while the HTTP API answers queries against the same engine.
//! Ctrl-C or SIGTERM closes everything in order: the API stops accepting
//! requests and finishes those in flight, then the pipeline drains and the
//! engine is closed.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use loghub::{FeedOptions, feed_lines, open_store, shutdown};
use loghub_api::{AppState, ServerMetrics, build_router};
use loghub_config::Config;
use loghub_pipeline::Ingestor;
use loghub_store::KvEngine;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Tag attached to every ingested line (`ds=<n>`, `ttl=<duration>`)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Lines per pipeline batch
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,
}

/// Run the serve command
pub async fn run(args: ServeArgs, config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        engine = config.store.engine.as_str(),
        api = config.api.enabled,
        "loghub starting"
    );

    if let Err(e) = run_server(args, config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("loghub shutdown complete");
    Ok(())
}

async fn run_server(args: ServeArgs, config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let store = open_store(&config)?;
    let ingestor = Arc::new(store.start_ingestor(&config));

    let api_handle = start_api_server(&config, &store.engine, &ingestor, cancel.clone()).await?;

    let options = FeedOptions {
        batch_size: args.batch_size,
        tags: args.tags,
        ..Default::default()
    };
    let sender = ingestor.sender();
    let mut feeder = tokio::spawn(async move {
        feed_lines(BufReader::new(tokio::io::stdin()), &sender, &options).await
    });

    let keep_serving = config.api.enabled;
    tokio::select! {
        _ = wait_for_shutdown() => {
            info!("shutdown signal received, stopping server...");
            feeder.abort();
        }
        result = &mut feeder => {
            match result {
                Ok(Ok(lines)) => info!(lines, "stdin closed"),
                Ok(Err(e)) => warn!(error = %e, "stdin feed stopped"),
                Err(e) => warn!(error = %e, "stdin feed task failed"),
            }
            if keep_serving {
                wait_for_shutdown().await;
                info!("shutdown signal received, stopping server...");
            }
        }
    }

    shutdown(&cancel, api_handle, &ingestor).await;

    Ok(())
}

/// Bind and spawn the API server when `[api]` enables it
async fn start_api_server(
    config: &Config,
    engine: &Arc<dyn KvEngine>,
    ingestor: &Arc<Ingestor>,
    cancel: CancellationToken,
) -> Result<Option<JoinHandle<()>>> {
    if !config.api.enabled {
        info!("API server disabled");
        return Ok(None);
    }

    let pipeline = Arc::clone(ingestor);
    let state = AppState::new(Arc::clone(engine))
        .with_server_metrics(ServerMetrics::new(Box::new(move || pipeline.metrics())));
    let app = build_router(state);

    let addr = config.api.bind;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API server to {addr}"))?;

    info!(addr = %addr, "API server listening");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "API server error");
            });
    });

    Ok(Some(handle))
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
