//! Item list upload (0x0705)
//!
//! ```text
//! count:u16 | time:bcd[5] (HHMMSS + 4 ms digits) | { raw_id:u32 | data[8] }*
//! ```
//!
//! The top three bits of `raw_id` are flags; the low 29 bits are the item id.

use bytes::Bytes;
use chrono::NaiveTime;
use serde::Serialize;

use super::{Decoded, MessageBody};
use crate::reader::ByteReader;
use crate::{Result, Warning, bcd};

const ITEM_LEN: usize = 12;
const ITEM_ID_MASK: u32 = 0x1FFF_FFFF;

/// One 12-byte item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub id: u32,
    pub flags: u8,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub data: [u8; 8],
}

impl ListItem {
    fn from_wire(raw_id: u32, data: [u8; 8]) -> Self {
        Self {
            id: raw_id & ITEM_ID_MASK,
            flags: (raw_id >> 29) as u8,
            data,
        }
    }
}

/// Decoded item list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemListReport {
    /// Count as declared on the wire
    pub count: u16,
    pub time: Option<NaiveTime>,
    pub items: Vec<ListItem>,
}

/// Decode a 0x0705 body
pub fn decode_item_list(body: &Bytes) -> Result<Decoded> {
    let mut reader = ByteReader::body(body);
    let mut warnings = Vec::new();

    let count = reader.read_u16("item count")?;
    let raw_time = reader.read_array::<5>("time")?;
    let time = bcd::time_of_day_millis(&raw_time);
    if time.is_none() {
        warnings.push(Warning::BadTime(bcd::digits(&raw_time)));
    }

    let mut items = Vec::with_capacity(reader.remaining() / ITEM_LEN);
    while reader.remaining() >= ITEM_LEN {
        let raw_id = reader.read_u32("item id")?;
        let data = reader.read_array::<8>("item data")?;
        items.push(ListItem::from_wire(raw_id, data));
    }

    if reader.remaining() > 0 {
        warnings.push(Warning::TrailingBytes(reader.remaining()));
    }
    if items.len() != count as usize {
        warnings.push(Warning::ItemCountMismatch {
            declared: count as usize,
            actual: items.len(),
        });
    }

    Ok(Decoded {
        body: MessageBody::ItemList(ItemListReport { count, time, items }),
        warnings,
    })
}
