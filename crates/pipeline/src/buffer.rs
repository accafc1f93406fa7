//! Bounded write buffer
//!
//! The only state shared between event admission and flushing. Pushes and
//! drains both happen under one lock, so a concurrent forced flush and
//! periodic flush each take a disjoint slice of the queue.

use std::collections::VecDeque;

use loghub_store::WriteEntry;
use parking_lot::Mutex;

#[derive(Debug)]
pub struct WriteBuffer {
    entries: Mutex<VecDeque<WriteEntry>>,
    capacity: usize,
}

impl WriteBuffer {
    /// Capacity below 1 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append, or hand the entry back when full
    pub fn try_push(&self, entry: WriteEntry) -> Result<(), WriteEntry> {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            return Err(entry);
        }
        entries.push_back(entry);
        Ok(())
    }

    /// Remove up to `max` entries in arrival order
    pub fn drain(&self, max: usize) -> Vec<WriteEntry> {
        let mut entries = self.entries.lock();
        let n = max.min(entries.len());
        entries.drain(..n).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
