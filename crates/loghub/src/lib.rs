//! loghub - wiring shared by the CLI commands
//!
//! Engine selection, line feeding, shutdown ordering and offline frame
//! decoding live here so they can be exercised without a terminal.

pub mod decode;
pub mod engine;
pub mod feed;
pub mod shutdown;

pub use decode::{DecodedFrame, decode_hex};
pub use engine::{Store, open_store};
pub use feed::{FeedOptions, feed_lines};
pub use shutdown::shutdown;
