//! Decoded message and the frame codec

use bytes::Bytes;
use serde::Serialize;

use crate::body::{BodyRegistry, MessageBody, standard_registry};
use crate::frame::{ESCAPE, FRAME_MARKER, checksum, escape, frame_interior, unescape};
use crate::identity::{identity_bytes, identity_string};
use crate::reader::ByteReader;
use crate::{
    IDENTITY_LEN_V0, IDENTITY_LEN_VERSIONED, MAX_BODY_LEN, ProtocolError, Result, Warning,
};

// Attribute bitflags
const ATTR_BODY_LEN: u16 = 0x03FF;
const ATTR_ENCRYPTED: u16 = 0x0400;
const ATTR_SPLIT: u16 = 0x2000;
const ATTR_VERSIONED: u16 = 0x4000;

/// A decoded frame
///
/// Created once per decode and never mutated afterwards. `body` always holds
/// the raw body bytes; `decoded` holds the typed view when the id has a
/// registered decoder and the frame is not one part of a split message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u16,
    pub serial_number: u16,
    pub device_id: String,
    /// `-1` when the frame carries no version byte
    pub version: i16,
    pub encrypted: bool,
    pub part_total: u16,
    pub part_index: u16,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub body: Bytes,
    pub decoded: MessageBody,
    /// Checksum byte carried by the frame, 0 if missing
    pub checksum: u8,
    pub warnings: Vec<Warning>,
}

impl Message {
    /// Unversioned, unsplit message with a raw body
    pub fn new(id: u16, device_id: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            id,
            serial_number: 0,
            device_id: device_id.into(),
            version: -1,
            encrypted: false,
            part_total: 1,
            part_index: 0,
            decoded: MessageBody::Raw(body.clone()),
            body,
            checksum: 0,
            warnings: Vec::new(),
        }
    }

    pub fn with_serial(mut self, serial_number: u16) -> Self {
        self.serial_number = serial_number;
        self
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version as i16;
        self
    }

    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    pub fn with_parts(mut self, part_total: u16, part_index: u16) -> Self {
        self.part_total = part_total;
        self.part_index = part_index;
        self
    }

    #[inline]
    pub fn is_versioned(&self) -> bool {
        self.version >= 0
    }

    /// True for one part of a split message
    #[inline]
    pub fn is_multipart(&self) -> bool {
        self.part_total > 1
    }

    /// Decode a framed message using the standard body decoders
    pub fn decode(raw: &[u8]) -> Result<Self> {
        Self::decode_with(raw, standard_registry())
    }

    /// Decode a framed message, routing the body through `registry`
    pub fn decode_with(raw: &[u8], registry: &BodyRegistry) -> Result<Self> {
        let plain = unescape(frame_interior(raw)?);
        let mut warnings = Vec::new();

        if checksum(&plain) != 0 {
            warnings.push(Warning::BadChecksum);
        }

        let mut reader = ByteReader::header(&plain);
        let id = reader.read_u16("message id")?;
        let attributes = reader.read_u16("attributes")?;
        let declared_len = (attributes & ATTR_BODY_LEN) as usize;

        let (version, identity) = if attributes & ATTR_VERSIONED != 0 {
            let version = reader.read_u8("version")? as i16;
            (
                version,
                reader.read_bytes(IDENTITY_LEN_VERSIONED, "device identity")?,
            )
        } else {
            (-1, reader.read_bytes(IDENTITY_LEN_V0, "device identity")?)
        };

        let serial_number = reader.read_u16("serial number")?;

        let (part_total, part_index) = if attributes & ATTR_SPLIT != 0 {
            (reader.read_u16("part total")?, reader.read_u16("part index")?)
        } else {
            (1, 0)
        };

        let (body, frame_checksum) = match reader.rest().split_last() {
            Some((&cs, body)) => (body, cs),
            None => {
                warnings.push(Warning::MissingChecksum);
                (&[][..], 0)
            }
        };

        if body.len() != declared_len {
            warnings.push(Warning::BadBodyLength {
                declared: declared_len,
                actual: body.len(),
            });
        }

        let body = Bytes::copy_from_slice(body);
        let decoded = if part_total > 1 {
            MessageBody::Raw(body.clone())
        } else {
            let decoded = registry.decode(id, &body);
            warnings.extend(decoded.warnings);
            decoded.body
        };

        Ok(Self {
            id,
            serial_number,
            device_id: identity_string(identity),
            version,
            encrypted: attributes & ATTR_ENCRYPTED != 0,
            part_total,
            part_index,
            body,
            decoded,
            checksum: frame_checksum,
            warnings,
        })
    }

    /// Encode into an escaped, marker-wrapped frame
    ///
    /// The checksum is recomputed; `self.checksum` is ignored.
    pub fn encode(&self) -> Result<Bytes> {
        if self.body.len() > MAX_BODY_LEN {
            return Err(ProtocolError::BodyTooLong {
                size: self.body.len(),
                max: MAX_BODY_LEN,
            });
        }

        let width = if self.is_versioned() {
            IDENTITY_LEN_VERSIONED
        } else {
            IDENTITY_LEN_V0
        };
        let identity = identity_bytes(&self.device_id, width)?;

        let mut attributes = self.body.len() as u16;
        if self.encrypted {
            attributes |= ATTR_ENCRYPTED;
        }
        if self.is_multipart() {
            attributes |= ATTR_SPLIT;
        }
        if self.is_versioned() {
            attributes |= ATTR_VERSIONED;
        }

        let mut plain = Vec::with_capacity(self.body.len() + 24);
        plain.extend_from_slice(&self.id.to_be_bytes());
        plain.extend_from_slice(&attributes.to_be_bytes());
        if self.is_versioned() {
            plain.push((self.version & 0xFF) as u8);
        }
        plain.extend_from_slice(&identity);
        plain.extend_from_slice(&self.serial_number.to_be_bytes());
        if self.is_multipart() {
            plain.extend_from_slice(&self.part_total.to_be_bytes());
            plain.extend_from_slice(&self.part_index.to_be_bytes());
        }
        plain.extend_from_slice(&self.body);
        plain.push(checksum(&plain));

        let stuffed = plain
            .iter()
            .filter(|&&b| b == FRAME_MARKER || b == ESCAPE)
            .count();
        let mut out = Vec::with_capacity(plain.len() + stuffed + 2);
        out.push(FRAME_MARKER);
        escape(&plain, &mut out);
        out.push(FRAME_MARKER);
        Ok(Bytes::from(out))
    }
}
