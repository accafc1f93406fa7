//! Ingestion metrics
//!
//! Atomic counters for tracking pipeline throughput.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for the ingestion pipeline
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Events handed to the pipeline
    events_received: AtomicU64,

    /// Events decoded and buffered for writing
    events_stored: AtomicU64,

    /// Events carrying an empty frame
    events_empty: AtomicU64,

    /// Events dropped for a bad line, payload or frame
    events_rejected: AtomicU64,

    /// Events dropped because no sequence number could be allocated
    sequence_failures: AtomicU64,

    /// Flushes that wrote at least one entry
    flushes: AtomicU64,

    /// Flushes forced by a full buffer
    forced_flushes: AtomicU64,

    /// Entries committed to the engine
    entries_written: AtomicU64,

    /// Entries lost to write failures
    write_failures: AtomicU64,

    /// Reclamation passes run
    reclaim_runs: AtomicU64,

    /// Expired entries removed by reclamation
    entries_expired: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            events_stored: AtomicU64::new(0),
            events_empty: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            sequence_failures: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            forced_flushes: AtomicU64::new(0),
            entries_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            reclaim_runs: AtomicU64::new(0),
            entries_expired: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self, count: u64) {
        self.events_received.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_stored(&self) {
        self.events_stored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_empty(&self) {
        self.events_empty.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sequence_failure(&self) {
        self.sequence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed flush
    #[inline]
    pub fn record_flush(&self, written: u64, failed: u64) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.entries_written.fetch_add(written, Ordering::Relaxed);
        self.write_failures.fetch_add(failed, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_forced_flush(&self) {
        self.forced_flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record entries lost to a failed transaction
    #[inline]
    pub fn record_write_failures(&self, count: u64) {
        self.write_failures.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reclaim(&self, expired: u64) {
        self.reclaim_runs.fetch_add(1, Ordering::Relaxed);
        self.entries_expired.fetch_add(expired, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_stored: self.events_stored.load(Ordering::Relaxed),
            events_empty: self.events_empty.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            sequence_failures: self.sequence_failures.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            forced_flushes: self.forced_flushes.load(Ordering::Relaxed),
            entries_written: self.entries_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            reclaim_runs: self.reclaim_runs.load(Ordering::Relaxed),
            entries_expired: self.entries_expired.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`IngestMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSnapshot {
    pub events_received: u64,
    pub events_stored: u64,
    pub events_empty: u64,
    pub events_rejected: u64,
    pub sequence_failures: u64,
    pub flushes: u64,
    pub forced_flushes: u64,
    pub entries_written: u64,
    pub write_failures: u64,
    pub reclaim_runs: u64,
    pub entries_expired: u64,
}

impl IngestSnapshot {
    /// Entries written since `earlier`
    pub fn written_since(&self, earlier: &IngestSnapshot) -> u64 {
        self.entries_written.saturating_sub(earlier.entries_written)
    }
}
