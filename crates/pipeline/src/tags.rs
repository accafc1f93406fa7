//! Event tag parsing
//!
//! Tags are `key=value` strings. Recognized keys:
//!
//! | Key | Value | Default |
//! |-----|-------|---------|
//! | `ds` | data source, integer 0-255 | 0 |
//! | `ttl` | humantime duration in `(0, max_ttl]` | `max_ttl` |
//!
//! Bad values fall back to the default; unknown keys are ignored.

use std::time::Duration;

use tracing::debug;

/// Per-event storage attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTags {
    pub data_source: u8,
    pub ttl: Duration,
}

impl EventTags {
    pub fn parse<S: AsRef<str>>(tags: &[S], max_ttl: Duration) -> Self {
        let mut parsed = Self {
            data_source: 0,
            ttl: max_ttl,
        };

        for tag in tags {
            let Some((key, value)) = tag.as_ref().split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "ds" => match value.parse::<u8>() {
                    Ok(ds) => parsed.data_source = ds,
                    Err(_) => debug!(value, "ignoring invalid ds tag"),
                },
                "ttl" => match humantime::parse_duration(value) {
                    Ok(ttl) if !ttl.is_zero() && ttl <= max_ttl => parsed.ttl = ttl,
                    _ => debug!(value, "ignoring invalid ttl tag"),
                },
                _ => {}
            }
        }

        parsed
    }
}
