//! Import command - bulk-ingest a capture file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use loghub::{FeedOptions, feed_lines, open_store};
use loghub_config::Config;
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::info;

/// Import command arguments
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Capture file with one log line per frame
    pub file: PathBuf,

    /// Tag attached to every line (`ds=<n>`, `ttl=<duration>`)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Lines per pipeline batch
    #[arg(long, default_value_t = 1000)]
    pub batch_size: usize,
}

/// Run the import command
pub async fn run(args: ImportArgs, config: Config) -> Result<()> {
    let file = File::open(&args.file)
        .await
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let store = open_store(&config)?;
    let ingestor = store.start_ingestor(&config);

    let options = FeedOptions {
        batch_size: args.batch_size,
        tags: args.tags,
        ..Default::default()
    };
    let fed = feed_lines(BufReader::new(file), &ingestor.sender(), &options).await;

    // Close even when feeding failed so buffered entries still land
    ingestor.close().await;
    let lines = fed?;

    let snap = ingestor.metrics();
    info!(
        file = %args.file.display(),
        lines,
        stored = snap.events_stored,
        empty = snap.events_empty,
        rejected = snap.events_rejected,
        written = snap.entries_written,
        "import complete"
    );
    println!(
        "{}: {} lines, {} stored, {} empty, {} rejected",
        args.file.display(),
        lines,
        snap.events_stored,
        snap.events_empty,
        snap.events_rejected
    );

    Ok(())
}
