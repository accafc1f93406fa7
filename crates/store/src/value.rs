//! Stored value codec
//!
//! ```text
//! codec:u8 | payload
//! ```
//!
//! Codec `0` is the raw frame, codec `1` an LZ4 block with the decompressed
//! size prepended. Frames above the threshold are compressed.

use crate::{Result, StoreError};

pub const CODEC_PLAIN: u8 = 0;
pub const CODEC_LZ4: u8 = 1;

/// Default size above which frames are compressed
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct ValueCodec {
    threshold: usize,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_THRESHOLD)
    }
}

impl ValueCodec {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn encode(&self, frame: &[u8]) -> Vec<u8> {
        if frame.len() > self.threshold {
            let compressed = lz4_flex::compress_prepend_size(frame);
            let mut out = Vec::with_capacity(compressed.len() + 1);
            out.push(CODEC_LZ4);
            out.extend_from_slice(&compressed);
            out
        } else {
            let mut out = Vec::with_capacity(frame.len() + 1);
            out.push(CODEC_PLAIN);
            out.extend_from_slice(frame);
            out
        }
    }

    /// Recover the stored frame
    pub fn decode(value: &[u8]) -> Result<Vec<u8>> {
        let (&codec, payload) = value
            .split_first()
            .ok_or_else(|| StoreError::invalid_value("empty value"))?;
        match codec {
            CODEC_PLAIN => Ok(payload.to_vec()),
            CODEC_LZ4 => lz4_flex::decompress_size_prepended(payload)
                .map_err(|e| StoreError::invalid_value(format!("lz4: {e}"))),
            other => Err(StoreError::invalid_value(format!("unknown codec {other}"))),
        }
    }
}
