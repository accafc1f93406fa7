//! loghub Protocol - JT/T808 frame codec
//!
//! This crate turns raw terminal frames into structured [`Message`]s and back:
//! - `frame` - marker validation, byte-stuffing, XOR checksum, stream scanning
//! - `Message` - header parsing driven by the attribute bitflags
//! - `body` - per-message-type body decoders behind a [`BodyRegistry`]
//!
//! # Wire Format
//!
//! ```text
//! 7E | id:u16 | attr:u16 | [version:u8] | device:6|10 | serial:u16 | [total:u16 index:u16] | body | xor:u8 | 7E
//! ```
//!
//! Attribute bits: 0-9 body length, 10 encrypted, 13 split, 14 versioned.
//!
//! # Integrity
//!
//! Checksum and length mismatches are soft: the message still decodes and the
//! anomaly is recorded in [`Message::warnings`]. Only a missing frame marker or
//! a header that runs past the end of the frame is a hard error.

mod bcd;
mod error;
mod frame;
mod identity;
mod message;
mod reader;
mod warning;

pub mod body;

pub use body::{
    BodyRegistry, Decoded, ExtensionRecord, Extensions, ItemListReport, ListItem,
    LocationReport, MessageBody, standard_registry,
};
pub use error::ProtocolError;
pub use frame::{FRAME_MARKER, FrameScanner, checksum, escape, scan_frames, unescape};
pub use identity::{identity_bytes, identity_string};
pub use message::Message;
pub use warning::Warning;

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Maximum body length expressible in the 10-bit attribute field
pub const MAX_BODY_LEN: usize = 0x03FF;

/// Device identity width (bytes) for unversioned frames
pub const IDENTITY_LEN_V0: usize = 6;

/// Device identity width (bytes) for versioned frames
pub const IDENTITY_LEN_VERSIONED: usize = 10;

/// Location report message id
pub const MSG_LOCATION_REPORT: u16 = 0x0200;

/// Item list (bus data upload) message id
pub const MSG_ITEM_LIST: u16 = 0x0705;

// Test modules - only compiled during testing
#[cfg(test)]
mod error_test;
