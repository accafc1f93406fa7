//! Query filters parsed from comma-separated parameters
//!
//! Unparsable items are ignored rather than rejected, and an empty filter
//! matches everything.

use std::collections::BTreeSet;

use loghub_protocol::LocationReport;
use loghub_store::Direction;

/// Message id allow-list, e.g. `"512,1797"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageIdFilter {
    ids: BTreeSet<u16>,
}

impl MessageIdFilter {
    pub fn parse(value: &str) -> Self {
        Self {
            ids: parse_list(value),
        }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = u16>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn matches(&self, id: u16) -> bool {
        self.ids.is_empty() || self.ids.contains(&id)
    }
}

/// Transfer directions to keep, e.g. `"tx"` or `"rx,tx"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionFilter {
    rx: bool,
    tx: bool,
}

impl Default for DirectionFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl DirectionFilter {
    pub const fn all() -> Self {
        Self { rx: true, tx: true }
    }

    pub const fn only(direction: Direction) -> Self {
        match direction {
            Direction::Rx => Self { rx: true, tx: false },
            Direction::Tx => Self { rx: false, tx: true },
        }
    }

    /// Naming neither direction selects both
    pub fn parse(value: &str) -> Self {
        let mut filter = Self { rx: false, tx: false };
        for item in value.split(',') {
            match item.trim().parse::<Direction>() {
                Ok(Direction::Rx) => filter.rx = true,
                Ok(Direction::Tx) => filter.tx = true,
                Err(_) => {}
            }
        }
        if !filter.rx && !filter.tx {
            return Self::all();
        }
        filter
    }

    #[inline]
    pub fn matches(&self, direction: Direction) -> bool {
        match direction {
            Direction::Rx => self.rx,
            Direction::Tx => self.tx,
        }
    }
}

/// Location report extension tags; a report passes when it carries any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    ids: BTreeSet<u8>,
}

impl ExtensionFilter {
    pub fn parse(value: &str) -> Self {
        Self {
            ids: parse_list(value),
        }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = u8>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn matches(&self, report: &LocationReport) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|&id| report.has_extension(id))
    }
}

fn parse_list<T: std::str::FromStr + Ord>(value: &str) -> BTreeSet<T> {
    value
        .split(',')
        .filter_map(|item| item.trim().parse().ok())
        .collect()
}
