//! Fixed-width index key
//!
//! Keys sort byte-wise in `(device, timestamp, sequence)` order so a device's
//! records for a time window are one contiguous range of the store.
//!
//! ```text
//! offset  width  field
//!   0      10    device identity, BCD right-aligned, zero-padded
//!  10       8    timestamp (unix seconds)
//!  18       8    sequence
//!  26       1    data source
//!  27       1    direction (0 = Rx, 1 = Tx)
//!  28       2    message id
//!  30       2    part index
//!  32       2    part total
//! ```
//!
//! All integers are big-endian.

use std::fmt;
use std::str::FromStr;

use loghub_protocol::{identity_bytes, identity_string};
use serde::Serialize;

use crate::{Result, StoreError};

/// Encoded key width
pub const KEY_LEN: usize = 34;

/// Device identity width within the key
pub const DEVICE_WIDTH: usize = 10;

const TS_OFFSET: usize = 10;
const SEQ_OFFSET: usize = 18;
const DS_OFFSET: usize = 26;
const DIR_OFFSET: usize = 27;
const MSG_ID_OFFSET: usize = 28;
const PART_INDEX_OFFSET: usize = 30;
const PART_TOTAL_OFFSET: usize = 32;

/// Transfer direction relative to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Terminal to platform
    #[default]
    Rx,
    /// Platform to terminal
    Tx,
}

impl Direction {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Rx => 0,
            Self::Tx => 1,
        }
    }

    /// Zero is `Rx`, anything else `Tx`
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Rx,
            _ => Self::Tx,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rx => "Rx",
            Self::Tx => "Tx",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rx" => Ok(Self::Rx),
            "tx" => Ok(Self::Tx),
            _ => Err(format!("unknown direction '{s}'")),
        }
    }
}

/// Per-record flags carried in the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFlags {
    pub data_source: u8,
    pub direction: Direction,
}

/// Storage identity of one stored frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub device_id: String,
    /// Unix seconds
    pub timestamp: i64,
    pub sequence: u64,
    pub flags: RecordFlags,
    pub message_id: u16,
    pub part_index: u16,
    pub part_total: u16,
}

impl IndexKey {
    pub fn encode(&self) -> Result<[u8; KEY_LEN]> {
        let mut out = [0u8; KEY_LEN];
        write_prefix(&mut out, &self.device_id, self.timestamp)?;
        out[SEQ_OFFSET..DS_OFFSET].copy_from_slice(&self.sequence.to_be_bytes());
        out[DS_OFFSET] = self.flags.data_source;
        out[DIR_OFFSET] = self.flags.direction.as_u8();
        out[MSG_ID_OFFSET..PART_INDEX_OFFSET].copy_from_slice(&self.message_id.to_be_bytes());
        out[PART_INDEX_OFFSET..PART_TOTAL_OFFSET].copy_from_slice(&self.part_index.to_be_bytes());
        out[PART_TOTAL_OFFSET..].copy_from_slice(&self.part_total.to_be_bytes());
        Ok(out)
    }

    pub fn decode(key: &[u8]) -> Result<Self> {
        let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| StoreError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        })?;

        let raw_ts = u64::from_be_bytes(field(key, TS_OFFSET));
        let timestamp =
            i64::try_from(raw_ts).map_err(|_| StoreError::InvalidTimestamp(raw_ts as i64))?;

        Ok(Self {
            device_id: identity_string(&key[..DEVICE_WIDTH]),
            timestamp,
            sequence: u64::from_be_bytes(field(key, SEQ_OFFSET)),
            flags: RecordFlags {
                data_source: key[DS_OFFSET],
                direction: Direction::from_u8(key[DIR_OFFSET]),
            },
            message_id: u16::from_be_bytes(field(key, MSG_ID_OFFSET)),
            part_index: u16::from_be_bytes(field(key, PART_INDEX_OFFSET)),
            part_total: u16::from_be_bytes(field(key, PART_TOTAL_OFFSET)),
        })
    }
}

fn field<const N: usize>(key: &[u8; KEY_LEN], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&key[offset..offset + N]);
    out
}

fn write_prefix(out: &mut [u8; KEY_LEN], device_id: &str, timestamp: i64) -> Result<()> {
    let device = identity_bytes(device_id, DEVICE_WIDTH)?;
    let ts = u64::try_from(timestamp).map_err(|_| StoreError::InvalidTimestamp(timestamp))?;
    out[..DEVICE_WIDTH].copy_from_slice(&device);
    out[TS_OFFSET..SEQ_OFFSET].copy_from_slice(&ts.to_be_bytes());
    Ok(())
}

/// Inclusive key bounds covering `device_id` over `[since, until]`
///
/// The low key carries `since` with all-zero trailing fields, the high key
/// `until` with all-ones trailing fields.
pub fn range_bounds(
    device_id: &str,
    since: i64,
    until: i64,
) -> Result<([u8; KEY_LEN], [u8; KEY_LEN])> {
    let mut low = [0u8; KEY_LEN];
    write_prefix(&mut low, device_id, since)?;

    let mut high = [0xFFu8; KEY_LEN];
    write_prefix(&mut high, device_id, until)?;

    Ok((low, high))
}
