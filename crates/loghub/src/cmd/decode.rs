//! Decode command - print frames as JSON

use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;
use loghub::decode_hex;
use tracing::warn;

/// Decode command arguments
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded frames; read from stdin when omitted
    pub hex: Vec<String>,

    /// Print one compact JSON object per line
    #[arg(long)]
    pub compact: bool,
}

/// Run the decode command
pub fn run(args: DecodeArgs) -> Result<()> {
    let input = if args.hex.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        args.hex.join("")
    };

    let frames = decode_hex(&input)?;
    if frames.is_empty() {
        warn!("no frames found in input");
    }

    for frame in &frames {
        let value = frame.to_json()?;
        let text = if args.compact {
            serde_json::to_string(&value)?
        } else {
            serde_json::to_string_pretty(&value)?
        };
        println!("{text}");
    }

    Ok(())
}
