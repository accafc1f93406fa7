//! Storage engine contract
//!
//! Engines are synchronous and shareable across threads. Async callers wrap
//! calls in `spawn_blocking`.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::Result;

/// One key/value pair to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    /// Entry disappears after this long; `None` keeps it forever
    pub ttl: Option<Duration>,
}

impl WriteEntry {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Outcome of a batch write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    /// Entries rejected individually; the rest of the batch still commits
    pub failed: usize,
}

/// Outcome of a reclamation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Expired entries removed
    pub expired: u64,
}

/// Scan callback; return `ControlFlow::Break(())` to stop
pub type ScanVisitor<'a> = dyn FnMut(&[u8], &[u8]) -> ControlFlow<()> + 'a;

/// Ordered key-value engine
pub trait KvEngine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &'static str;

    /// Write all entries in one transaction
    fn write_batch(&self, entries: &[WriteEntry]) -> Result<WriteReport>;

    /// Visit entries in ascending key order starting at `start`
    ///
    /// The scan sees a snapshot taken when it starts. Expired entries are
    /// skipped.
    fn scan(&self, start: &[u8], visitor: &mut ScanVisitor<'_>) -> Result<()>;

    /// Reserve `count` values from the named counter, returning the first
    fn lease_sequence(&self, name: &str, count: u64) -> Result<u64>;

    /// Give back `[next, leased_end)` if no later lease was taken
    ///
    /// Returns whether the counter was rewound.
    fn return_sequence(&self, name: &str, leased_end: u64, next: u64) -> Result<bool>;

    /// Drop expired entries and compact storage
    fn reclaim(&self) -> Result<ReclaimReport>;

    /// Release resources; later calls fail with `StoreError::Closed`
    fn close(&self) -> Result<()>;
}
