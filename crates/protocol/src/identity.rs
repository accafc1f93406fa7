//! Device identity encoding
//!
//! Identities travel as packed BCD digits. In text form they are the hex
//! rendering of those bytes with leading zeros trimmed, so `04 02 61 39 46 51`
//! reads as `"40261394651"`.

use crate::{ProtocolError, Result};

/// Render identity bytes as trimmed digits
pub fn identity_string(bytes: &[u8]) -> String {
    let digits = hex::encode(bytes);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pack an identity into `width` bytes, right-aligned and zero-padded
pub fn identity_bytes(device_id: &str, width: usize) -> Result<Vec<u8>> {
    if device_id.is_empty() || !device_id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ProtocolError::invalid_identity(device_id));
    }
    if device_id.len() > width * 2 {
        return Err(ProtocolError::identity_too_long(device_id.len(), width));
    }
    let padded = format!("{:0>w$}", device_id, w = width * 2);
    hex::decode(padded).map_err(|_| ProtocolError::invalid_identity(device_id))
}
