//! Line feeding into the pipeline channel
//!
//! Lines are grouped into [`EventBatch`]es. A batch is sent when it is full,
//! when `linger` passes without a new line, or at end of input.

use std::time::Duration;

use anyhow::{Context, Result};
use loghub_pipeline::{Event, EventBatch};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Batching and tagging of fed lines
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub batch_size: usize,
    pub linger: Duration,
    /// `key=value` tags attached to every event
    pub tags: Vec<String>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            linger: Duration::from_millis(200),
            tags: Vec::new(),
        }
    }
}

/// Feed every non-blank line of `reader`; returns how many were sent
///
/// Each batch is acknowledged before the next is sent, so a returned count
/// means every line reached the write buffer.
pub async fn feed_lines<R>(
    reader: R,
    sender: &mpsc::Sender<EventBatch>,
    options: &FeedOptions,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let batch_size = options.batch_size.max(1);
    let mut lines = reader.lines();
    let mut pending = Vec::with_capacity(batch_size);
    let mut sent = 0u64;

    loop {
        let next = if pending.is_empty() {
            lines.next_line().await
        } else {
            match tokio::time::timeout(options.linger, lines.next_line()).await {
                Ok(next) => next,
                Err(_) => {
                    sent += send(sender, &mut pending).await?;
                    continue;
                }
            }
        };

        match next.context("failed to read input")? {
            Some(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                pending.push(Event::new(line).with_tags(options.tags.iter().cloned()));
                if pending.len() >= batch_size {
                    sent += send(sender, &mut pending).await?;
                }
            }
            None => break,
        }
    }

    if !pending.is_empty() {
        sent += send(sender, &mut pending).await?;
    }
    Ok(sent)
}

async fn send(sender: &mpsc::Sender<EventBatch>, pending: &mut Vec<Event>) -> Result<u64> {
    let events = std::mem::take(pending);
    let count = events.len() as u64;
    let (batch, ack) = EventBatch::new(events);
    sender
        .send(batch)
        .await
        .map_err(|_| anyhow::anyhow!("pipeline stopped accepting events"))?;
    ack.await
        .map_err(|_| anyhow::anyhow!("pipeline dropped a batch before acknowledging it"))?;
    debug!(events = count, "batch acknowledged");
    Ok(count)
}
