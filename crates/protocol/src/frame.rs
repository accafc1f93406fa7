//! Frame delimiting, byte-stuffing and checksum
//!
//! Frames are wrapped in `0x7E` markers. Inside a frame the marker and the
//! escape byte itself are stuffed as two-byte sequences:
//!
//! ```text
//! 7D 01 <-> 7E
//! 7D 02 <-> 7D
//! ```
//!
//! A `7D` followed by any other byte is not an escape and passes through.

use bytes::{Buf, Bytes, BytesMut};

use crate::{ProtocolError, Result};

/// Frame delimiter
pub const FRAME_MARKER: u8 = 0x7E;

/// Escape lead byte
pub const ESCAPE: u8 = 0x7D;

const ESCAPED_MARKER: u8 = 0x01;
const ESCAPED_ESCAPE: u8 = 0x02;

/// Validate the markers and return the still-escaped interior
pub(crate) fn frame_interior(raw: &[u8]) -> Result<&[u8]> {
    if raw.len() < 2 {
        return Err(ProtocolError::malformed("frame shorter than two markers"));
    }
    if raw[0] != FRAME_MARKER {
        return Err(ProtocolError::malformed("missing start marker"));
    }
    if raw[raw.len() - 1] != FRAME_MARKER {
        return Err(ProtocolError::malformed("missing end marker"));
    }
    let interior = &raw[1..raw.len() - 1];
    if interior.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(interior)
}

/// Remove byte-stuffing from a frame interior
pub fn unescape(escaped: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(escaped.len());
    let mut i = 0;
    while i < escaped.len() {
        let b = escaped[i];
        if b == ESCAPE && i + 1 < escaped.len() {
            match escaped[i + 1] {
                ESCAPED_MARKER => {
                    out.push(FRAME_MARKER);
                    i += 2;
                    continue;
                }
                ESCAPED_ESCAPE => {
                    out.push(ESCAPE);
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        out.push(b);
        i += 1;
    }
    out
}

/// Apply byte-stuffing, appending to `out`
pub fn escape(plain: &[u8], out: &mut Vec<u8>) {
    out.reserve(plain.len());
    for &b in plain {
        match b {
            FRAME_MARKER => out.extend_from_slice(&[ESCAPE, ESCAPED_MARKER]),
            ESCAPE => out.extend_from_slice(&[ESCAPE, ESCAPED_ESCAPE]),
            _ => out.push(b),
        }
    }
}

/// XOR of all bytes
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

// =============================================================================
// Stream Scanning
// =============================================================================

/// Splits a byte stream into marker-delimited frames
///
/// Bytes before the first marker are discarded. Repeated markers collapse, so
/// `7E 7E` between two frames yields no empty frame. An unterminated tail is
/// held until more data arrives.
#[derive(Debug, Default)]
pub struct FrameScanner {
    pending: BytesMut,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append stream data
    pub fn push(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Next complete frame, markers included
    pub fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            let start = self.pending.iter().position(|&b| b == FRAME_MARKER)?;
            self.pending.advance(start);

            // collapse runs of markers down to one
            let run = self
                .pending
                .iter()
                .take_while(|&&b| b == FRAME_MARKER)
                .count();
            if run > 1 {
                self.pending.advance(run - 1);
            }

            let end = self.pending[1..].iter().position(|&b| b == FRAME_MARKER)? + 1;
            let frame = self.pending.split_to(end + 1).freeze();
            if frame.len() > 2 {
                return Some(frame);
            }
        }
    }

    /// Drain the scanner at end of input; an unterminated tail is discarded
    pub fn finish(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

/// Split a complete capture into frames
pub fn scan_frames(data: &[u8]) -> Vec<Bytes> {
    let mut scanner = FrameScanner::new();
    scanner.push(data);
    let mut frames = Vec::new();
    while let Some(frame) = scanner.next_frame() {
        frames.push(frame);
    }
    frames
}
