//! loghub Store - keys, values and engines
//!
//! Every decoded frame is stored under a 34-byte [`IndexKey`] whose byte order
//! is `(device, timestamp, sequence)`, so a device's history over a time
//! window is one contiguous key range.
//!
//! # Engines
//!
//! | Engine | Persistence | Use |
//! |--------|-------------|-----|
//! | [`MemoryEngine`] | none | tests, development |
//! | [`SqliteEngine`] | WAL file | production |
//!
//! Both implement [`KvEngine`]: atomic batch writes with per-entry TTL,
//! snapshot scans, leased counters and space reclamation.

mod error;

pub mod engine;
pub mod key;
pub mod memory;
pub mod sequence;
pub mod sqlite;
pub mod value;

pub use engine::{KvEngine, ReclaimReport, ScanVisitor, WriteEntry, WriteReport};
pub use error::StoreError;
pub use key::{DEVICE_WIDTH, Direction, IndexKey, KEY_LEN, RecordFlags, range_bounds};
pub use memory::MemoryEngine;
pub use sequence::{DEFAULT_BANDWIDTH, MESSAGE_SEQUENCE, Sequence};
pub use sqlite::SqliteEngine;
pub use value::ValueCodec;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
