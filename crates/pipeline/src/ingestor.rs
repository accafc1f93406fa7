//! Ingestor - event admission, buffered writes and scheduled maintenance
//!
//! ```text
//! listener ──→ mpsc<EventBatch> ──→ [receiver task] ──→ WriteBuffer ──→ KvEngine
//!                                                          ↑
//!                                  [flush task] ───────────┘
//!                                  [reclaim task] ──→ KvEngine::reclaim
//!                                  [stats task] ──→ tracing
//! ```
//!
//! Engine calls are blocking and run on `spawn_blocking`. All four tasks
//! observe one `CancellationToken`. [`Ingestor::close`] first waits for
//! in-flight admissions, then cancels the tasks and waits for them, then
//! drains the buffer, reclaims, releases the sequence lease and closes the
//! engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use loghub_config::IngestConfig;
use loghub_protocol::Message;
use loghub_store::{IndexKey, KvEngine, RecordFlags, Sequence, ValueCodec, WriteEntry};
use parking_lot::Mutex;
use tokio::sync::{OwnedRwLockReadGuard, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::buffer::WriteBuffer;
use crate::event::{Event, EventBatch};
use crate::line::{parse_line, trim_event};
use crate::metrics::{IngestMetrics, IngestSnapshot};
use crate::tags::EventTags;
use crate::{PipelineError, Result};

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Lifecycle of an [`Ingestor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Open,
    Closing,
    Closed,
}

impl IngestState {
    fn from_u8(value: u8) -> Self {
        match value {
            OPEN => Self::Open,
            CLOSING => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// What happened to an admitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Decoded and buffered
    Stored,
    /// Frame had nothing between its markers
    Empty,
}

/// State shared by the ingestor handle and its tasks
struct Shared {
    engine: Arc<dyn KvEngine>,
    sequence: Arc<Sequence>,
    buffer: WriteBuffer,
    codec: ValueCodec,
    max_ttl: Duration,
    metrics: IngestMetrics,
    last_stats: Mutex<(Instant, IngestSnapshot)>,
}

impl Shared {
    fn handle_event(&self, event: &Event) -> Result<Admission> {
        self.metrics.record_received(1);

        let text = trim_event(&event.message);
        let tags = EventTags::parse(&event.tags, self.max_ttl);

        let sequence = match self.sequence.next() {
            Ok(sequence) => sequence,
            Err(e) => {
                self.metrics.record_sequence_failure();
                warn!(error = %e, sequence = %self.sequence.name(), "sequence allocation failed, event dropped");
                return Err(e.into());
            }
        };

        match self.build_entry(text, tags, sequence) {
            Ok(entry) => {
                self.enqueue(entry);
                self.metrics.record_stored();
                Ok(Admission::Stored)
            }
            Err(PipelineError::Protocol(e)) if e.is_skippable() => {
                self.metrics.record_empty();
                Ok(Admission::Empty)
            }
            Err(e) => {
                self.metrics.record_rejected();
                warn!(error = %e, event = text, "event rejected");
                Err(e)
            }
        }
    }

    fn build_entry(&self, text: &str, tags: EventTags, sequence: u64) -> Result<WriteEntry> {
        let line = parse_line(text)?;
        let message = Message::decode(&line.payload)?;
        if !message.warnings.is_empty() {
            debug!(
                device = %message.device_id,
                msg_id = format_args!("0x{:04x}", message.id),
                warnings = ?message.warnings,
                "frame decoded with warnings"
            );
        }

        let key = IndexKey {
            device_id: message.device_id,
            timestamp: line.timestamp,
            sequence,
            flags: RecordFlags {
                data_source: tags.data_source,
                direction: line.direction,
            },
            message_id: message.id,
            part_index: message.part_index,
            part_total: message.part_total,
        };
        let key = key.encode()?;
        let value = self.codec.encode(&line.payload);

        Ok(WriteEntry::new(key.to_vec(), value).with_ttl(tags.ttl))
    }

    /// Buffer an entry, flushing first while the buffer is full
    fn enqueue(&self, mut entry: WriteEntry) {
        loop {
            match self.buffer.try_push(entry) {
                Ok(()) => return,
                Err(rejected) => {
                    entry = rejected;
                    self.metrics.record_forced_flush();
                    debug!(capacity = self.buffer.capacity(), "write buffer full, forcing flush");
                    self.flush();
                }
            }
        }
    }

    /// Write one buffer's worth of entries; returns how many were drained
    fn flush(&self) -> usize {
        let entries = self.buffer.drain(self.buffer.capacity());
        if entries.is_empty() {
            return 0;
        }

        match self.engine.write_batch(&entries) {
            Ok(report) => {
                self.metrics
                    .record_flush(report.written as u64, report.failed as u64);
                debug!(
                    entries = report.written,
                    failed = report.failed,
                    "flushed"
                );
            }
            Err(e) => {
                self.metrics.record_write_failures(entries.len() as u64);
                error!(error = %e, entries = entries.len(), "flush failed");
            }
        }
        entries.len()
    }

    fn flush_all(&self) {
        while self.flush() > 0 {}
    }

    fn reclaim(&self) {
        let started = Instant::now();
        match self.engine.reclaim() {
            Ok(report) => {
                self.metrics.record_reclaim(report.expired);
                info!(
                    engine = self.engine.name(),
                    expired = report.expired,
                    elapsed = ?started.elapsed(),
                    "space reclaimed"
                );
            }
            Err(e) => error!(error = %e, engine = self.engine.name(), "space reclamation failed"),
        }
    }

    fn report_stats(&self) {
        let snapshot = self.metrics.snapshot();
        let mut last = self.last_stats.lock();
        let elapsed = last.0.elapsed().as_secs_f64();
        let written = snapshot.written_since(&last.1);
        let rate = if elapsed > 0.0 {
            written as f64 / elapsed
        } else {
            0.0
        };
        info!(
            written,
            rate = format_args!("{rate:.1}/s"),
            buffered = self.buffer.len(),
            received = snapshot.events_received,
            rejected = snapshot.events_rejected,
            "ingest throughput"
        );
        *last = (Instant::now(), snapshot);
    }

    /// `gate` is held until the blocking work finishes, even if the caller
    /// stops waiting
    async fn ingest_batch(
        self: &Arc<Self>,
        mut batch: EventBatch,
        gate: Option<AdmissionGate>,
    ) {
        let events = std::mem::take(&mut batch.events);
        let shared = Arc::clone(self);
        let handled = tokio::task::spawn_blocking(move || {
            let _gate = gate;
            for event in &events {
                // failures are counted and logged per event
                let _ = shared.handle_event(event);
            }
        })
        .await;
        if let Err(e) = handled {
            error!(error = %e, "event batch task failed");
        }
        batch.acknowledge();
    }

    async fn run_blocking(self: &Arc<Self>, job: fn(&Shared)) {
        let shared = Arc::clone(self);
        if let Err(e) = tokio::task::spawn_blocking(move || job(&shared)).await {
            error!(error = %e, "background job failed");
        }
    }
}

/// Read half of the admission lock; `true` while the ingestor is open
type AdmissionGate = OwnedRwLockReadGuard<bool>;

/// Ingestion pipeline handle
///
/// # Example
///
/// ```ignore
/// let ingestor = Ingestor::start(engine, sequence, &config.ingest, codec);
/// let (batch, ack) = EventBatch::new(events);
/// ingestor.sender().send(batch).await?;
/// ack.await?;
/// ingestor.close().await;
/// ```
pub struct Ingestor {
    shared: Arc<Shared>,
    state: AtomicU8,
    admission: Arc<RwLock<bool>>,
    sender: mpsc::Sender<EventBatch>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Ingestor {
    /// Start the receiver and the scheduled tasks
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        engine: Arc<dyn KvEngine>,
        sequence: Arc<Sequence>,
        config: &IngestConfig,
        codec: ValueCodec,
    ) -> Self {
        let shared = Arc::new(Shared {
            engine,
            sequence,
            buffer: WriteBuffer::new(config.buffer_size),
            codec,
            max_ttl: config.max_ttl,
            metrics: IngestMetrics::new(),
            last_stats: Mutex::new((Instant::now(), IngestSnapshot::default())),
        });
        let cancel = CancellationToken::new();
        let (sender, receiver) = mpsc::channel(config.queue_size.max(1));

        let tasks = vec![
            tokio::spawn(run_receiver(
                Arc::clone(&shared),
                receiver,
                cancel.clone(),
            )),
            tokio::spawn(run_periodic(
                Arc::clone(&shared),
                config.flush_interval,
                cancel.clone(),
                |s: &Shared| {
                    s.flush();
                },
            )),
            tokio::spawn(run_periodic(
                Arc::clone(&shared),
                config.reclaim_interval,
                cancel.clone(),
                Shared::reclaim,
            )),
            tokio::spawn(run_periodic(
                Arc::clone(&shared),
                config.stats_interval,
                cancel.clone(),
                Shared::report_stats,
            )),
        ];

        info!(
            engine = shared.engine.name(),
            buffer_size = shared.buffer.capacity(),
            flush_interval = ?config.flush_interval,
            reclaim_interval = ?config.reclaim_interval,
            max_ttl = ?config.max_ttl,
            "ingestor started"
        );

        Self {
            shared,
            state: AtomicU8::new(OPEN),
            admission: Arc::new(RwLock::new(true)),
            sender,
            cancel,
            tasks: Mutex::new(tasks),
        }
    }

    /// Channel feeding the receiver task
    pub fn sender(&self) -> mpsc::Sender<EventBatch> {
        self.sender.clone()
    }

    pub fn state(&self) -> IngestState {
        IngestState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Enter admission; `close` waits for every gate to drop
    async fn admit(&self) -> Result<AdmissionGate> {
        let gate = Arc::clone(&self.admission).read_owned().await;
        if *gate {
            Ok(gate)
        } else {
            Err(PipelineError::Closed)
        }
    }

    /// Admit one event directly, bypassing the channel
    pub async fn handle_event(&self, event: Event) -> Result<Admission> {
        let gate = self.admit().await?;
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let _gate = gate;
            shared.handle_event(&event)
        })
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "event task failed");
            Err(PipelineError::Closed)
        })
    }

    /// Admit every event of a batch, then acknowledge it
    pub async fn ingest_batch(&self, batch: EventBatch) -> Result<()> {
        let gate = self.admit().await?;
        self.shared.ingest_batch(batch, Some(gate)).await;
        Ok(())
    }

    /// Write buffered entries now
    pub async fn flush(&self) {
        self.shared.run_blocking(Shared::flush_all).await;
    }

    pub fn metrics(&self) -> IngestSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Entries waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.shared.buffer.len()
    }

    /// Stop admission and shut everything down
    ///
    /// Batches already queued on the channel are still ingested. Calling
    /// this more than once is a no-op.
    pub async fn close(&self) {
        if self
            .state
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        // waits out admissions still buffering, then refuses new ones
        *self.admission.write().await = false;

        self.cancel.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "ingest task failed");
            }
        }

        let shared = Arc::clone(&self.shared);
        let closed = tokio::task::spawn_blocking(move || {
            shared.flush_all();
            shared.reclaim();
            if let Err(e) = shared.sequence.release() {
                warn!(error = %e, "failed to release sequence lease");
            }
            shared.engine.close()
        })
        .await;
        match closed {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "failed to close engine"),
            Err(e) => error!(error = %e, "shutdown task failed"),
        }

        self.state.store(CLOSED, Ordering::Release);

        let snapshot = self.metrics();
        info!(
            received = snapshot.events_received,
            stored = snapshot.events_stored,
            empty = snapshot.events_empty,
            rejected = snapshot.events_rejected,
            written = snapshot.entries_written,
            write_failures = snapshot.write_failures,
            "ingestor closed"
        );
    }
}

async fn run_receiver(
    shared: Arc<Shared>,
    mut receiver: mpsc::Receiver<EventBatch>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            batch = receiver.recv() => match batch {
                Some(batch) => shared.ingest_batch(batch, None).await,
                None => break,
            },
        }
    }

    // drain what senders already queued
    receiver.close();
    let mut drained = 0usize;
    while let Some(batch) = receiver.recv().await {
        drained += batch.len();
        shared.ingest_batch(batch, None).await;
    }
    debug!(drained, "event receiver stopped");
}

async fn run_periodic(
    shared: Arc<Shared>,
    period: Duration,
    cancel: CancellationToken,
    job: fn(&Shared),
) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => shared.run_blocking(job).await,
        }
    }
}
