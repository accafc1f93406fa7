//! Message body decoders
//!
//! Each known message id maps to a [`DecodeFn`] in a [`BodyRegistry`]. A
//! decoder failure never fails the surrounding message: the body stays
//! [`MessageBody::Raw`] and a [`Warning::BodyDecodeFailed`] is recorded.

mod item_list;
mod location;

use std::collections::HashMap;

use bytes::Bytes;
use once_cell::sync::Lazy;
use serde::Serialize;

pub use item_list::{ItemListReport, ListItem, decode_item_list};
pub use location::{ExtensionRecord, Extensions, LocationReport, decode_location};

use crate::{MSG_ITEM_LIST, MSG_LOCATION_REPORT, Result, Warning};

/// Typed view of a message body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum MessageBody {
    Location(LocationReport),
    ItemList(ItemListReport),
    Raw(#[serde(serialize_with = "hex::serde::serialize")] Bytes),
}

impl MessageBody {
    /// Location report view, if this body is one
    pub fn as_location(&self) -> Option<&LocationReport> {
        match self {
            Self::Location(report) => Some(report),
            _ => None,
        }
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Decoder output: the typed body and any soft anomalies
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub body: MessageBody,
    pub warnings: Vec<Warning>,
}

impl Decoded {
    pub fn new(body: MessageBody) -> Self {
        Self {
            body,
            warnings: Vec::new(),
        }
    }

    pub fn raw(body: &Bytes) -> Self {
        Self::new(MessageBody::Raw(body.clone()))
    }
}

/// Body decoder signature
pub type DecodeFn = fn(&Bytes) -> Result<Decoded>;

/// Message id to body decoder mapping
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    decoders: HashMap<u16, DecodeFn>,
}

impl BodyRegistry {
    /// Registry with no decoders; every body stays raw
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the location report and item list decoders
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(MSG_LOCATION_REPORT, decode_location);
        registry.register(MSG_ITEM_LIST, decode_item_list);
        registry
    }

    /// Register (or replace) the decoder for `id`
    pub fn register(&mut self, id: u16, decoder: DecodeFn) -> &mut Self {
        self.decoders.insert(id, decoder);
        self
    }

    pub fn contains(&self, id: u16) -> bool {
        self.decoders.contains_key(&id)
    }

    /// Run the decoder for `id`; unknown ids yield a raw body
    pub fn try_decode(&self, id: u16, body: &Bytes) -> Result<Decoded> {
        match self.decoders.get(&id) {
            Some(decoder) => decoder(body),
            None => Ok(Decoded::raw(body)),
        }
    }

    /// Like [`try_decode`](Self::try_decode) but falls back to a raw body
    pub fn decode(&self, id: u16, body: &Bytes) -> Decoded {
        match self.try_decode(id, body) {
            Ok(decoded) => decoded,
            Err(e) => Decoded {
                body: MessageBody::Raw(body.clone()),
                warnings: vec![Warning::BodyDecodeFailed(e.to_string())],
            },
        }
    }
}

static STANDARD: Lazy<BodyRegistry> = Lazy::new(BodyRegistry::standard);

/// Shared standard registry
pub fn standard_registry() -> &'static BodyRegistry {
    &STANDARD
}

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;
