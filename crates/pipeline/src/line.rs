//! Event line parsing
//!
//! Two line formats are accepted:
//!
//! ```text
//! 20220930233928 Rx 7e0200...7e
//! 2022-09-30 23:39:28 Tx 7e8001...7e
//! 2022-09-30 23:39:28 GpsDataService:12 - (1A2B)收到报文类型：512,报文内容：7e0200...7e
//! ```
//!
//! The last is the legacy gateway log and is always inbound. Timestamps are
//! UTC wall-clock seconds.

use chrono::NaiveDateTime;
use loghub_store::Direction;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{PipelineError, Result};

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<timestamp>\d{14}|\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\s+(?P<direction>[RrTt][Xx])\s+(?P<payload>[0-9A-Fa-f]+)$",
    )
    .unwrap()
});

static GATEWAY_LOG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<timestamp>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) GpsDataService:\d+ - \([0-9A-F]+\)收到报文类型：\d+,报文内容：(?P<payload>[a-f0-9]+)$",
    )
    .unwrap()
});

const COMPACT_TS: &str = "%Y%m%d%H%M%S";
const SPACED_TS: &str = "%Y-%m-%d %H:%M:%S";

/// A parsed event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Unix seconds
    pub timestamp: i64,
    pub direction: Direction,
    /// Framed bytes, markers included
    pub payload: Vec<u8>,
}

/// Strip NUL, CR, LF, tab and space padding
pub fn trim_event(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '\0' | '\r' | '\n' | '\t' | ' '))
}

/// Parse a trimmed event line
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let (timestamp, direction, payload) = if let Some(caps) = LINE_RE.captures(line) {
        let direction = caps["direction"]
            .parse::<Direction>()
            .map_err(PipelineError::InvalidLine)?;
        (
            caps.name("timestamp"),
            direction,
            caps.name("payload"),
        )
    } else if let Some(caps) = GATEWAY_LOG_RE.captures(line) {
        (caps.name("timestamp"), Direction::Rx, caps.name("payload"))
    } else {
        return Err(PipelineError::invalid_line(line));
    };

    let (Some(timestamp), Some(payload)) = (timestamp, payload) else {
        return Err(PipelineError::invalid_line(line));
    };

    Ok(ParsedLine {
        timestamp: parse_timestamp(timestamp.as_str())?,
        direction,
        payload: hex::decode(payload.as_str())
            .map_err(|e| PipelineError::InvalidPayload(e.to_string()))?,
    })
}

fn parse_timestamp(text: &str) -> Result<i64> {
    let format = if text.len() == 14 { COMPACT_TS } else { SPACED_TS };
    NaiveDateTime::parse_from_str(text, format)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|e| PipelineError::invalid_line(format!("bad timestamp '{text}': {e}")))
}
