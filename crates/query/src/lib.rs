//! loghub Query - reading stored frames back
//!
//! Two queries over one device's time window:
//!
//! - [`query_raw`]: every stored frame with its key attributes, filtered by
//!   message id and direction
//! - [`query_body`]: decoded bodies of one message id, with split messages
//!   reassembled from their parts
//!
//! # Usage
//!
//! ```ignore
//! use loghub_query::{BodyQuery, ExtensionFilter, query_body};
//!
//! let query = BodyQuery::new("40261394651", since, until, 0x0200)
//!     .with_extension_ids(ExtensionFilter::parse("1,48"));
//! for body in query_body(engine.as_ref(), &query)? {
//!     println!("{} {:?}", body.timestamp, body.body);
//! }
//! ```
//!
//! Queries are synchronous and read from engine snapshots only; async callers
//! run them on `spawn_blocking`.

mod body;
mod error;
mod filter;
mod raw;
mod scan;

pub use body::{BodyQuery, DecodedBody, query_body, query_body_with};
pub use error::{QueryError, Result};
pub use filter::{DirectionFilter, ExtensionFilter, MessageIdFilter};
pub use raw::{RawQuery, RawRecord, RawResult, query_raw};

#[cfg(test)]
mod testutil;
