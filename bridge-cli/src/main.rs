//! # webbridge
//!
//! CLI tool for exercising the webbridge host/webview protocol against a
//! scripted host.
//!
//! ## Commands
//!
//! - `payload`: Print the current sync payload
//! - `decode`: Decode a payload file as a receiver of a given version would
//! - `demo`: Mount the demo page and run every action once
//! - `call`: Invoke a single operation
//!
//! ## Example
//!
//! ```bash
//! # Show what the page pushes on mount
//! webbridge payload
//!
//! # Check that a v1 receiver refuses a v2 payload
//! webbridge payload > payload.json
//! webbridge decode payload.json --max-version 1
//!
//! # Read an NFC tag from the scripted host
//! webbridge call readNfcTag
//!
//! # Run the whole page with verbose logging
//! RUST_LOG=debug webbridge demo
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webbridge_types::LATEST_PAYLOAD_VERSION;

mod commands;
mod config;

use commands::{call, decode, demo, payload};
use config::Config;

/// CLI tool for exercising the webbridge protocol.
#[derive(Parser, Debug)]
#[command(name = "webbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./webbridge.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current sync payload as JSON
    Payload {
        /// Payload version to emit
        #[arg(long, default_value_t = LATEST_PAYLOAD_VERSION)]
        version: u8,
    },

    /// Decode a sync payload file
    Decode {
        /// JSON file to decode
        file: PathBuf,

        /// Highest version the receiver knows
        #[arg(long, default_value_t = LATEST_PAYLOAD_VERSION)]
        max_version: u8,
    },

    /// Mount the demo page against the scripted host and run every action
    Demo,

    /// Invoke one operation on the scripted host
    Call {
        /// Operation name (e.g. supportNfc, readNfcTag)
        operation: String,

        /// Input as JSON (default: {})
        #[arg(long, short)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(command = ?cli.command, "configuration loaded");

    match cli.command {
        Commands::Payload { version } => {
            payload::run(&config, version)?;
        }
        Commands::Decode { file, max_version } => {
            decode::run(&file, max_version).await?;
        }
        Commands::Demo => {
            demo::run(&config).await?;
        }
        Commands::Call { operation, input } => {
            call::run(&config, &operation, input.as_deref()).await?;
        }
    }

    Ok(())
}
