//! Raw frame listing

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use loghub_protocol::{Warning, standard_registry};
use loghub_store::{Direction, KvEngine};
use serde::Serialize;

use crate::Result;
use crate::filter::{DirectionFilter, MessageIdFilter};
use crate::scan::{load_message, scan_device};

/// Raw listing parameters; `since` and `until` are inclusive epoch seconds
#[derive(Debug, Clone)]
pub struct RawQuery {
    pub device_id: String,
    pub since: i64,
    pub until: i64,
    pub message_ids: MessageIdFilter,
    pub directions: DirectionFilter,
}

impl RawQuery {
    pub fn new(device_id: impl Into<String>, since: i64, until: i64) -> Self {
        Self {
            device_id: device_id.into(),
            since,
            until,
            message_ids: MessageIdFilter::default(),
            directions: DirectionFilter::all(),
        }
    }

    pub fn with_message_ids(mut self, filter: MessageIdFilter) -> Self {
        self.message_ids = filter;
        self
    }

    pub fn with_directions(mut self, filter: DirectionFilter) -> Self {
        self.directions = filter;
        self
    }
}

/// One stored frame with its key attributes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub raw: Vec<u8>,
    pub direction: Direction,
    #[serde(rename = "ds")]
    pub data_source: u8,
    #[serde(rename = "sn")]
    pub sequence: u64,
    #[serde(rename = "msgId")]
    pub message_id: u16,
    #[serde(rename = "msgSn")]
    pub serial_number: u16,
    pub device_id: String,
    pub version: i16,
    pub encrypted: bool,
    pub part_total: u16,
    pub part_index: u16,
    pub warnings: Vec<Warning>,
}

/// Records passing the filters plus every message id seen in the window
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResult {
    pub msgs: Vec<RawRecord>,
    /// Sorted, collected before filtering
    pub msg_ids: Vec<u16>,
}

/// List stored frames of one device in `[since, until]`
pub fn query_raw(engine: &dyn KvEngine, query: &RawQuery) -> Result<RawResult> {
    let mut msgs = Vec::new();
    let mut seen = BTreeSet::new();

    scan_device(
        engine,
        &query.device_id,
        query.since,
        query.until,
        |key, value| {
            if key.timestamp > query.until {
                return ControlFlow::Break(());
            }
            seen.insert(key.message_id);
            if !query.message_ids.matches(key.message_id)
                || !query.directions.matches(key.flags.direction)
            {
                return ControlFlow::Continue(());
            }
            let Some((raw, message)) = load_message(&key, value, standard_registry()) else {
                return ControlFlow::Continue(());
            };
            msgs.push(RawRecord {
                timestamp: timestamp(key.timestamp),
                raw,
                direction: key.flags.direction,
                data_source: key.flags.data_source,
                sequence: key.sequence,
                message_id: message.id,
                serial_number: message.serial_number,
                device_id: message.device_id,
                version: message.version,
                encrypted: message.encrypted,
                part_total: message.part_total,
                part_index: message.part_index,
                warnings: message.warnings,
            });
            ControlFlow::Continue(())
        },
    )?;

    Ok(RawResult {
        msgs,
        msg_ids: seen.into_iter().collect(),
    })
}

pub(crate) fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}
