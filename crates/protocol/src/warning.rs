//! Soft decode anomalies

use std::fmt;

use serde::{Serialize, Serializer};

/// Non-fatal anomaly found while decoding a frame or body
///
/// Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// XOR over the unescaped frame is not zero
    BadChecksum,
    /// Declared body length differs from the bytes present
    BadBodyLength { declared: usize, actual: usize },
    /// Frame ends right after the header
    MissingChecksum,
    /// Extension tag appears more than once
    DuplicateExtension(u8),
    /// Item list count field disagrees with parsed items
    ItemCountMismatch { declared: usize, actual: usize },
    /// Bytes left after the last complete item
    TrailingBytes(usize),
    /// BCD time field is not a valid time
    BadTime(String),
    /// Registered decoder failed; body kept raw
    BodyDecodeFailed(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadChecksum => write!(f, "bad checksum"),
            Self::BadBodyLength { declared, actual } => {
                write!(f, "bad body length: declared {declared}, actual {actual}")
            }
            Self::MissingChecksum => write!(f, "missing checksum"),
            Self::DuplicateExtension(id) => write!(f, "duplicate extension 0x{id:02x}"),
            Self::ItemCountMismatch { declared, actual } => {
                write!(f, "item count mismatch: declared {declared}, actual {actual}")
            }
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes"),
            Self::BadTime(text) => write!(f, "bad time '{text}'"),
            Self::BodyDecodeFailed(reason) => write!(f, "body decode failed: {reason}"),
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
