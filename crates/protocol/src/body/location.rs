//! Location report (0x0200)
//!
//! ```text
//! alarm:u32 | status:u32 | lat:u32 | lon:u32 | alt:u16 | speed:u16 | heading:u16 | time:bcd[6]
//! { tag:u8 | len:u8 | payload[len] }*
//! ```

use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Decoded, MessageBody};
use crate::reader::ByteReader;
use crate::{Result, Warning, bcd};

/// Fixed header width preceding the extension records
pub const LOCATION_HEADER_LEN: usize = 28;

const EXT_MILEAGE: u8 = 0x01;
const EXT_FUEL: u8 = 0x02;
const EXT_RECORDER_SPEED: u8 = 0x03;
const EXT_ANALOG: u8 = 0x2B;
const EXT_SIGNAL_STRENGTH: u8 = 0x30;
const EXT_SATELLITES: u8 = 0x31;

/// One TLV record, kept in wire order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionRecord {
    pub id: u8,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub data: Bytes,
}

/// Typed values of the well-known extension tags
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    /// km
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    /// litres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f64>,
    /// km/h
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analog_0: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analog_1: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellites: Option<u8>,
}

impl Extensions {
    /// Fill the typed field for `record`; wrong-width payloads are left untyped
    fn absorb(&mut self, record: &ExtensionRecord) {
        let data = record.data.as_ref();
        match (record.id, data.len()) {
            (EXT_MILEAGE, 4) => self.mileage = Some(be_u32(data) as f64 / 10.0),
            (EXT_FUEL, 2) => self.fuel = Some(be_u16(data) as f64 / 10.0),
            (EXT_RECORDER_SPEED, 2) => self.recorder_speed = Some(be_u16(data) as f64 / 10.0),
            (EXT_ANALOG, 4) => {
                let v = be_u32(data);
                self.analog_0 = Some((v & 0xFFFF) as u16);
                self.analog_1 = Some((v >> 16) as u16);
            }
            (EXT_SIGNAL_STRENGTH, 1) => self.signal_strength = Some(data[0]),
            (EXT_SATELLITES, 1) => self.satellites = Some(data[0]),
            _ => {}
        }
    }
}

fn be_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

fn be_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

/// Decoded location report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub alarm: u32,
    pub status: u32,
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Metres
    pub altitude: u16,
    /// km/h
    pub speed: f64,
    pub heading: u16,
    pub time: Option<NaiveDateTime>,
    pub extensions: Vec<ExtensionRecord>,
    pub parsed: Extensions,
}

impl LocationReport {
    /// True if any record carries tag `id`
    pub fn has_extension(&self, id: u8) -> bool {
        self.extensions.iter().any(|ext| ext.id == id)
    }

    pub fn extension(&self, id: u8) -> Option<&ExtensionRecord> {
        self.extensions.iter().find(|ext| ext.id == id)
    }
}

/// Decode a 0x0200 body
pub fn decode_location(body: &Bytes) -> Result<Decoded> {
    let mut reader = ByteReader::body(body);
    let mut warnings = Vec::new();

    let alarm = reader.read_u32("alarm")?;
    let status = reader.read_u32("status")?;
    let latitude = reader.read_u32("latitude")? as f64 / 1e6;
    let longitude = reader.read_u32("longitude")? as f64 / 1e6;
    let altitude = reader.read_u16("altitude")?;
    let speed = reader.read_u16("speed")? as f64 / 10.0;
    let heading = reader.read_u16("heading")?;
    let raw_time = reader.read_array::<6>("time")?;

    let time = bcd::date_time(&raw_time);
    if time.is_none() {
        warnings.push(Warning::BadTime(bcd::digits(&raw_time)));
    }

    let mut extensions: Vec<ExtensionRecord> = Vec::new();
    let mut parsed = Extensions::default();
    while reader.remaining() > 0 {
        let id = reader.read_u8("extension id")?;
        let len = reader.read_u8("extension length")? as usize;
        let start = reader.position();
        reader.read_bytes(len, "extension payload")?;
        let record = ExtensionRecord {
            id,
            data: body.slice(start..start + len),
        };

        if extensions.iter().any(|ext| ext.id == id) {
            warnings.push(Warning::DuplicateExtension(id));
        } else {
            parsed.absorb(&record);
        }
        extensions.push(record);
    }

    Ok(Decoded {
        body: MessageBody::Location(LocationReport {
            alarm,
            status,
            latitude,
            longitude,
            altitude,
            speed,
            heading,
            time,
            extensions,
            parsed,
        }),
        warnings,
    })
}
