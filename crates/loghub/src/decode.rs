//! Offline frame decoding

use anyhow::{Context, Result};
use loghub_protocol::{FrameScanner, Message};
use serde_json::{Value, json};
use tracing::warn;

/// One frame found in the input
#[derive(Debug)]
pub struct DecodedFrame {
    pub raw: Vec<u8>,
    pub message: loghub_protocol::Result<Message>,
}

impl DecodedFrame {
    /// JSON view: the message, or the error next to the offending frame
    pub fn to_json(&self) -> Result<Value> {
        match &self.message {
            Ok(message) => serde_json::to_value(message).context("failed to serialize message"),
            Err(e) => Ok(json!({
                "error": e.to_string(),
                "frame": hex::encode(&self.raw),
            })),
        }
    }
}

/// Decode every frame in a hex string
///
/// Whitespace is ignored, so frames may be split across lines or separated
/// by spaces. Bytes outside markers are skipped, and so is a trailing frame
/// without its closing marker.
pub fn decode_hex(input: &str) -> Result<Vec<DecodedFrame>> {
    let compact: String = input.split_whitespace().collect();
    let bytes = hex::decode(&compact).context("input is not valid hex")?;

    let mut scanner = FrameScanner::new();
    scanner.push(&bytes);
    let mut frames = Vec::new();
    while let Some(frame) = scanner.next_frame() {
        frames.push(DecodedFrame {
            message: Message::decode(&frame),
            raw: frame.to_vec(),
        });
    }

    let dropped = scanner.finish();
    if dropped > 0 {
        warn!(bytes = dropped, "ignoring unterminated trailing frame");
    }
    Ok(frames)
}
