//! CLI commands

pub mod decode;
pub mod import;
pub mod serve;
