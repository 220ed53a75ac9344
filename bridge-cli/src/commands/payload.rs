//! Print the current sync payload.

use anyhow::{bail, Context, Result};
use webbridge_core::build_current_payload;
use webbridge_types::{SyncPayload, SyncPayloadV1, LATEST_PAYLOAD_VERSION};

use crate::config::Config;

/// Build the payload for `config`, encoded as `version`.
pub fn build(config: &Config, version: u8) -> Result<SyncPayload> {
    let current = build_current_payload(&config.payload);
    match version {
        1 => Ok(SyncPayload::V1(SyncPayloadV1 {
            database: current.database,
            tables: current.tables,
        })),
        2 => Ok(SyncPayload::V2(current)),
        other => bail!("payload version must be 1..={LATEST_PAYLOAD_VERSION}, got {other}"),
    }
}

/// Run the payload command.
pub fn run(config: &Config, version: u8) -> Result<()> {
    let payload = build(config, version)?;
    let json = serde_json::to_string_pretty(&payload).context("Failed to encode payload")?;
    println!("{json}");
    Ok(())
}
