//! loghub - JT/T 808 frame log store
//!
//! # Usage
//!
//! ```bash
//! # Ingest gateway log lines from stdin and serve the query API
//! gateway-tail | loghub serve --config loghub.toml
//!
//! # Bulk-load a capture file
//! loghub import capture.log --tag ds=2
//!
//! # Decode frames offline
//! loghub decode 7e0200...7e
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loghub_config::{Config, LogFormat, LogLevel, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// loghub - JT/T 808 frame log store
#[derive(Parser, Debug)]
#[command(name = "loghub")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest lines from stdin and serve the query API
    Serve(cmd::serve::ServeArgs),

    /// Bulk-ingest a capture file
    Import(cmd::import::ImportArgs),

    /// Decode hex frames and print them as JSON
    Decode(cmd::decode::DecodeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let config = load_config(cli.config.as_deref())?;
            init_logging(resolve_log_level(cli.log_level, &config), &config)?;
            cmd::serve::run(args, config).await
        }
        Command::Import(args) => {
            let config = load_config(cli.config.as_deref())?;
            init_logging(resolve_log_level(cli.log_level, &config), &config)?;
            cmd::import::run(args, config).await
        }
        Command::Decode(args) => {
            // Decode prints JSON to stdout; only warnings go to the log
            let config = Config::default();
            init_logging(cli.log_level.unwrap_or(LogLevel::Warn), &config)?;
            cmd::decode::run(args)
        }
    }
}

/// Load the configuration file, or defaults when none is given
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path
        && !path.exists()
    {
        anyhow::bail!("config file not found: {}", path.display());
    }
    Config::load(path).context("failed to load configuration")
}

/// Resolve log level: CLI flag > config file
fn resolve_log_level(cli_level: Option<LogLevel>, config: &Config) -> LogLevel {
    cli_level.unwrap_or(config.log.level)
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: LogLevel, config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(level.as_str())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match config.log.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
    };
    let layer = match config.log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    Ok(())
}
