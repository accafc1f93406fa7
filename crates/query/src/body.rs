//! Body query with multi-part reassembly
//!
//! Split messages are stored one record per part. Consecutive records with the
//! same `(message_id, part_total)` and consecutive part indices form a group;
//! a complete group is concatenated in index order and decoded once.

use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use loghub_protocol::{
    BodyRegistry, Bytes, MSG_LOCATION_REPORT, Message, MessageBody, Warning, standard_registry,
};
use loghub_store::{IndexKey, KvEngine};
use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::filter::ExtensionFilter;
use crate::raw::timestamp;
use crate::scan::{load_message, scan_device};

/// Body query parameters; `since` and `until` are inclusive epoch seconds
#[derive(Debug, Clone)]
pub struct BodyQuery {
    pub device_id: String,
    pub since: i64,
    pub until: i64,
    pub message_id: u16,
    /// Only records from this data source, if set
    pub data_source: Option<u8>,
    /// Location reports must carry at least one of these tags
    pub extension_ids: ExtensionFilter,
}

impl BodyQuery {
    pub fn new(device_id: impl Into<String>, since: i64, until: i64, message_id: u16) -> Self {
        Self {
            device_id: device_id.into(),
            since,
            until,
            message_id,
            data_source: None,
            extension_ids: ExtensionFilter::default(),
        }
    }

    pub fn with_data_source(mut self, data_source: u8) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn with_extension_ids(mut self, filter: ExtensionFilter) -> Self {
        self.extension_ids = filter;
        self
    }

    fn selects(&self, key: &IndexKey) -> bool {
        key.message_id == self.message_id
            && self
                .data_source
                .is_none_or(|ds| ds == key.flags.data_source)
    }
}

/// One logical message body, reassembled from its parts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedBody {
    /// Timestamp of the first part
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "msgId")]
    pub message_id: u16,
    pub device_id: String,
    /// Protocol version of the first part
    pub version: i16,
    pub parts: u16,
    /// Concatenated body bytes of all parts
    #[serde(serialize_with = "hex::serde::serialize")]
    pub raw_body: Bytes,
    #[serde(flatten)]
    pub body: MessageBody,
    pub warnings: Vec<Warning>,
}

/// Decode message bodies of one device and id in `[since, until]`
pub fn query_body(engine: &dyn KvEngine, query: &BodyQuery) -> Result<Vec<DecodedBody>> {
    query_body_with(engine, query, standard_registry())
}

/// [`query_body`] with a caller-supplied decoder registry
pub fn query_body_with(
    engine: &dyn KvEngine,
    query: &BodyQuery,
    registry: &BodyRegistry,
) -> Result<Vec<DecodedBody>> {
    // bodies are decoded once per group, not per stored part
    let frames_only = BodyRegistry::empty();
    let mut assembler = Assembler::default();
    let mut out = Vec::new();

    scan_device(
        engine,
        &query.device_id,
        query.since,
        query.until,
        |key, value| {
            let selected = query.selects(&key);
            // past `until` only the next part of an open group is taken
            if key.timestamp > query.until && !(selected && assembler.continues(&key)) {
                return ControlFlow::Break(());
            }
            if !selected {
                return ControlFlow::Continue(());
            }
            if !assembler.continues(&key) {
                assembler.reset();
            }
            let Some((_, message)) = load_message(&key, value, &frames_only) else {
                return ControlFlow::Continue(());
            };
            if let Some(body) = assembler.push(key, message, registry)
                && keep(query, &body)
            {
                out.push(body);
            }
            ControlFlow::Continue(())
        },
    )?;

    if !assembler.is_empty() {
        debug!(
            parts = assembler.parts.len(),
            device = %query.device_id,
            "discarding unterminated multi-part group"
        );
    }
    Ok(out)
}

fn keep(query: &BodyQuery, body: &DecodedBody) -> bool {
    match (&body.body, body.message_id) {
        (MessageBody::Location(report), MSG_LOCATION_REPORT) => query.extension_ids.matches(report),
        _ => true,
    }
}

#[derive(Default)]
struct Assembler {
    parts: Vec<(IndexKey, Message)>,
    warnings: Vec<Warning>,
}

impl Assembler {
    fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn reset(&mut self) {
        if !self.parts.is_empty() {
            debug!(parts = self.parts.len(), "discarding incomplete multi-part group");
        }
        self.parts.clear();
        self.warnings.clear();
    }

    /// Whether `key` is the next part of the group in progress
    fn continues(&self, key: &IndexKey) -> bool {
        self.parts.last().is_some_and(|(last, _)| {
            last.message_id == key.message_id
                && last.part_total == key.part_total
                && last.part_index.checked_add(1) == Some(key.part_index)
        })
    }

    fn push(
        &mut self,
        key: IndexKey,
        mut message: Message,
        registry: &BodyRegistry,
    ) -> Option<DecodedBody> {
        let expected = usize::from(key.part_total.max(1));
        self.warnings.append(&mut message.warnings);
        self.parts.push((key, message));
        if self.parts.len() < expected {
            return None;
        }

        let parts = std::mem::take(&mut self.parts);
        let mut warnings = std::mem::take(&mut self.warnings);
        let (first, head) = &parts[0];
        let body = if parts.len() == 1 {
            head.body.clone()
        } else {
            let mut joined = Vec::with_capacity(parts.iter().map(|(_, m)| m.body.len()).sum());
            for (_, part) in &parts {
                joined.extend_from_slice(&part.body);
            }
            Bytes::from(joined)
        };

        let decoded = registry.decode(first.message_id, &body);
        warnings.extend(decoded.warnings);
        Some(DecodedBody {
            timestamp: timestamp(first.timestamp),
            message_id: first.message_id,
            device_id: head.device_id.clone(),
            version: head.version,
            parts: parts.len() as u16,
            raw_body: body,
            body: decoded.body,
            warnings,
        })
    }
}
