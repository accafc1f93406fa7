//! Device-window scanning shared by the raw and body queries

use std::ops::ControlFlow;

use loghub_protocol::{BodyRegistry, Message};
use loghub_store::{DEVICE_WIDTH, IndexKey, KvEngine, ValueCodec, range_bounds};
use tracing::warn;

use crate::{QueryError, Result};

/// Visit every decodable key of `device` from `since` onward
///
/// The scan ends at the first key belonging to another device. Callers decide
/// where to stop within the device. Undecodable keys are logged and skipped.
pub(crate) fn scan_device<F>(
    engine: &dyn KvEngine,
    device_id: &str,
    since: i64,
    until: i64,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(IndexKey, &[u8]) -> ControlFlow<()>,
{
    if since > until {
        return Err(QueryError::InvalidRange { since, until });
    }
    let (low, _) = range_bounds(device_id, since, until)?;
    let device = &low[..DEVICE_WIDTH];

    engine.scan(&low, &mut |key, value| {
        if key.get(..DEVICE_WIDTH) != Some(device) {
            return ControlFlow::Break(());
        }
        match IndexKey::decode(key) {
            Ok(decoded) => visit(decoded, value),
            Err(e) => {
                warn!(error = %e, key = %hex::encode(key), "skipping undecodable key");
                ControlFlow::Continue(())
            }
        }
    })?;
    Ok(())
}

/// Decode a stored value back into its frame; failures are logged
pub(crate) fn load_message(
    key: &IndexKey,
    value: &[u8],
    registry: &BodyRegistry,
) -> Option<(Vec<u8>, Message)> {
    let raw = match ValueCodec::decode(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, device = %key.device_id, sequence = key.sequence, "skipping undecodable value");
            return None;
        }
    };
    match Message::decode_with(&raw, registry) {
        Ok(message) => Some((raw, message)),
        Err(e) => {
            warn!(error = %e, device = %key.device_id, sequence = key.sequence, "skipping undecodable frame");
            None
        }
    }
}
