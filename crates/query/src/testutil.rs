//! Fixtures for query tests

use std::sync::atomic::{AtomicUsize, Ordering};

use loghub_protocol::Message;
use loghub_store::{
    Direction, IndexKey, KvEngine, MemoryEngine, ReclaimReport, RecordFlags, ScanVisitor,
    ValueCodec, WriteEntry, WriteReport,
};

pub const DEVICE: &str = "40261394651";

/// Location report body carrying twelve extension records
pub const LOCATION_BODY: &str = "00000000000c00c2018be6d8071c17180006000000b422093023392801040027997303020000140400000000150400000000160400000000170200002504000000002b040000000030011f310113eb11000700d4010087a209000600f800000000ef0d00000000000049249200001103";

pub fn location_body() -> Vec<u8> {
    hex::decode(LOCATION_BODY).unwrap()
}

/// Stores frames under sequential keys
pub struct Fixture {
    pub engine: MemoryEngine,
    sequence: u64,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            engine: MemoryEngine::new(),
            sequence: 0,
        }
    }

    pub fn store(&mut self, timestamp: i64, direction: Direction, data_source: u8, message: Message) {
        let frame = message.encode().unwrap();
        let key = IndexKey {
            device_id: message.device_id.clone(),
            timestamp,
            sequence: self.sequence,
            flags: RecordFlags {
                data_source,
                direction,
            },
            message_id: message.id,
            part_index: message.part_index,
            part_total: message.part_total,
        };
        self.sequence += 1;
        let value = ValueCodec::default().encode(&frame);
        self.engine
            .write_batch(&[WriteEntry::new(key.encode().unwrap().to_vec(), value)])
            .unwrap();
    }

    pub fn store_rx(&mut self, timestamp: i64, message: Message) {
        self.store(timestamp, Direction::Rx, 0, message);
    }

    /// Store `body` split into `chunks` parts, all at `timestamp`
    pub fn store_split(&mut self, timestamp: i64, id: u16, body: &[u8], chunks: usize) {
        let size = body.len().div_ceil(chunks);
        let parts: Vec<&[u8]> = body.chunks(size).collect();
        let total = parts.len() as u16;
        for (i, part) in parts.into_iter().enumerate() {
            let message = Message::new(id, DEVICE, part.to_vec()).with_parts(total, i as u16 + 1);
            self.store_rx(timestamp, message);
        }
    }
}

/// Counts the keys a scan hands to its visitor
pub struct CountingEngine<'a> {
    inner: &'a dyn KvEngine,
    visited: AtomicUsize,
}

impl<'a> CountingEngine<'a> {
    pub fn new(inner: &'a dyn KvEngine) -> Self {
        Self {
            inner,
            visited: AtomicUsize::new(0),
        }
    }

    pub fn visited(&self) -> usize {
        self.visited.load(Ordering::Relaxed)
    }
}

impl KvEngine for CountingEngine<'_> {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn write_batch(&self, entries: &[WriteEntry]) -> loghub_store::Result<WriteReport> {
        self.inner.write_batch(entries)
    }

    fn scan(&self, start: &[u8], visitor: &mut ScanVisitor<'_>) -> loghub_store::Result<()> {
        self.inner.scan(start, &mut |key, value| {
            self.visited.fetch_add(1, Ordering::Relaxed);
            visitor(key, value)
        })
    }

    fn lease_sequence(&self, name: &str, count: u64) -> loghub_store::Result<u64> {
        self.inner.lease_sequence(name, count)
    }

    fn return_sequence(&self, name: &str, leased_end: u64, next: u64) -> loghub_store::Result<bool> {
        self.inner.return_sequence(name, leased_end, next)
    }

    fn reclaim(&self) -> loghub_store::Result<ReclaimReport> {
        self.inner.reclaim()
    }

    fn close(&self) -> loghub_store::Result<()> {
        self.inner.close()
    }
}
