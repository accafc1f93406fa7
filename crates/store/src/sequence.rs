//! Persistent sequence allocator
//!
//! Values are leased from an engine counter in blocks of `bandwidth`, so the
//! engine is touched once per block. A restart skips the unused part of the
//! last block unless [`Sequence::release`] handed it back first; values never
//! repeat either way.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::Result;
use crate::engine::KvEngine;

/// Counter name used for record sequence numbers
pub const MESSAGE_SEQUENCE: &str = "msgseq";

/// Default block size
pub const DEFAULT_BANDWIDTH: u64 = 10_000;

#[derive(Debug, Default)]
struct Lease {
    next: u64,
    end: u64,
}

/// Monotonic, restart-safe sequence numbers
pub struct Sequence {
    engine: Arc<dyn KvEngine>,
    name: String,
    bandwidth: u64,
    lease: Mutex<Lease>,
}

impl Sequence {
    /// Bandwidth below 1 is treated as 1
    pub fn new(engine: Arc<dyn KvEngine>, name: impl Into<String>, bandwidth: u64) -> Self {
        Self {
            engine,
            name: name.into(),
            bandwidth: bandwidth.max(1),
            lease: Mutex::new(Lease::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next value, leasing a new block when the current one is spent
    pub fn next(&self) -> Result<u64> {
        let mut lease = self.lease.lock();
        if lease.next >= lease.end {
            let start = self.engine.lease_sequence(&self.name, self.bandwidth)?;
            lease.next = start;
            lease.end = start + self.bandwidth;
            debug!(sequence = %self.name, start, end = lease.end, "sequence block leased");
        }
        let value = lease.next;
        lease.next += 1;
        Ok(value)
    }

    /// Return the unused tail of the current block
    pub fn release(&self) -> Result<()> {
        let mut lease = self.lease.lock();
        if lease.next < lease.end {
            let returned = self
                .engine
                .return_sequence(&self.name, lease.end, lease.next)?;
            debug!(sequence = %self.name, next = lease.next, returned, "sequence released");
            lease.end = lease.next;
        }
        Ok(())
    }
}
