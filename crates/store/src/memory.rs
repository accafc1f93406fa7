//! In-memory ordered engine
//!
//! The map lives behind an `Arc` so a scan clones the pointer and iterates
//! without holding the lock. Writers copy the map only while a scan still
//! holds the previous version.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::engine::{KvEngine, ReclaimReport, ScanVisitor, WriteEntry, WriteReport};
use crate::{Result, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    #[inline]
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// Engine for tests and development; counters are not persisted
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: RwLock<Arc<BTreeMap<Vec<u8>, Entry>>>,
    counters: Mutex<HashMap<String, u64>>,
    closed: AtomicBool,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entries, expired ones included until reclaimed
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl KvEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write_batch(&self, entries: &[WriteEntry]) -> Result<WriteReport> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut guard = self.data.write();
        let map = Arc::make_mut(&mut *guard);
        for entry in entries {
            map.insert(
                entry.key.clone(),
                Entry {
                    value: Bytes::copy_from_slice(&entry.value),
                    expires_at: entry.ttl.map(|ttl| now + ttl),
                },
            );
        }
        Ok(WriteReport {
            written: entries.len(),
            failed: 0,
        })
    }

    fn scan(&self, start: &[u8], visitor: &mut ScanVisitor<'_>) -> Result<()> {
        self.ensure_open()?;
        let snapshot = self.data.read().clone();
        let now = Instant::now();
        for (key, entry) in snapshot.range(start.to_vec()..) {
            if !entry.is_live(now) {
                continue;
            }
            if visitor(key, &entry.value).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn lease_sequence(&self, name: &str, count: u64) -> Result<u64> {
        self.ensure_open()?;
        let mut counters = self.counters.lock();
        let next = counters.entry(name.to_string()).or_insert(0);
        let start = *next;
        *next += count;
        Ok(start)
    }

    fn return_sequence(&self, name: &str, leased_end: u64, next: u64) -> Result<bool> {
        self.ensure_open()?;
        let mut counters = self.counters.lock();
        match counters.get_mut(name) {
            Some(counter) if *counter == leased_end => {
                *counter = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn reclaim(&self) -> Result<ReclaimReport> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut guard = self.data.write();
        let map = Arc::make_mut(&mut *guard);
        let before = map.len();
        map.retain(|_, entry| entry.is_live(now));
        Ok(ReclaimReport {
            expired: (before - map.len()) as u64,
        })
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
