//! Decode a sync payload file the way a receiver would.

use anyhow::{Context, Result};
use std::path::Path;
use webbridge_core::PayloadDecoder;
use webbridge_types::SyncPayload;

/// Decode `path` with a receiver that knows versions up to `max_version`.
pub async fn decode(path: &Path, max_version: u8) -> Result<SyncPayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let decoder = PayloadDecoder::new(max_version);
    let payload = decoder
        .decode(&bytes)
        .with_context(|| format!("Rejected by a v{} receiver", decoder.max_version()))?;
    Ok(payload)
}

/// Run the decode command.
pub async fn run(path: &Path, max_version: u8) -> Result<()> {
    let payload = decode(path, max_version).await?;

    println!("=== sync payload ===");
    println!("  Version:  {}", payload.version());
    println!("  Database: {}", payload.database());
    println!("  Tables:   {}", payload.tables().join(", "));
    if payload.version() >= 2 {
        println!("  Maps:     {}", payload.maps().join(", "));
    }

    let latest = payload.into_latest();
    println!();
    println!("As latest:");
    println!(
        "{}",
        serde_json::to_string_pretty(&SyncPayload::V2(latest))
            .context("Failed to encode payload")?
    );
    Ok(())
}
