//! loghub Pipeline - event ingestion
//!
//! Turns text events from a listener into stored frames.
//!
//! # Flow
//!
//! ```text
//! Event ──→ trim ──→ tags ──→ sequence ──→ line ──→ Message::decode
//!                                                        │
//!                          IndexKey + ValueCodec ←───────┘
//!                                    │
//!                               WriteBuffer ──→ KvEngine (periodic / forced flush)
//! ```
//!
//! # Key Design
//!
//! - **Bounded buffer**: a full buffer forces a flush; events are never dropped
//!   for lack of space
//! - **Blocking off the runtime**: engine calls run on `spawn_blocking`
//! - **Ordered shutdown**: cancel → await tasks → drain → reclaim → release
//!   sequence → close engine
//!
//! # Example
//!
//! ```ignore
//! use loghub_pipeline::{Event, EventBatch, Ingestor};
//!
//! let ingestor = Ingestor::start(engine, sequence, &config.ingest, codec);
//! let (batch, ack) = EventBatch::new(vec![Event::new(line).with_tags(["ds=1"])]);
//! ingestor.sender().send(batch).await?;
//! ack.await?;
//! ingestor.close().await;
//! ```

mod buffer;
mod error;
mod event;
mod ingestor;
mod line;
mod metrics;
mod tags;

pub use buffer::WriteBuffer;
pub use error::{PipelineError, Result};
pub use event::{Event, EventBatch};
pub use ingestor::{Admission, IngestState, Ingestor};
pub use line::{ParsedLine, parse_line, trim_event};
pub use metrics::{IngestMetrics, IngestSnapshot};
pub use tags::EventTags;

#[cfg(test)]
mod ingestor_test;
