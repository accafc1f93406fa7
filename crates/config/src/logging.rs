//! Logging configuration
//!
//! Controls the internal logging behavior of loghub.

use std::str::FromStr;

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - normal operation (default)
    #[default]
    Info,
    /// Warn level - warnings only
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts the lowercase names plus `warning`, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Log output destination
///
/// stdout is reserved for `decode` output, so logs default to stderr.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to stderr (default)
    #[default]
    Stderr,
    /// Write to stdout
    Stdout,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
/// output = "stderr"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,

    /// Output destination (stderr, stdout)
    /// Default: stderr
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Console,
            output: LogOutput::Stderr,
        }
    }
}
