//! Run the demo page against the scripted host.

use anyhow::{Context, Result};
use std::sync::Arc;
use webbridge_client::{BridgeClient, ClientError, MockHost};
use webbridge_surface::{Surface, SurfaceConfig, SurfaceError, SurfaceState};
use webbridge_types::{
    CorrelationId, EditPhotoOptions, MediaTypes, PickImageOptions, PickSource, QueryInput,
};

use crate::config::Config;

/// Mount the surface and press every button once.
///
/// Failed actions are reported and the run continues; a failure is never
/// fatal to the page.
pub async fn exercise(config: &Config) -> Result<SurfaceState> {
    let host = config.host.mock_host();
    let client = Arc::new(BridgeClient::with_config(config.client_config(), host));
    let surface = Surface::new(
        Arc::clone(&client),
        SurfaceConfig {
            payload: config.payload.clone(),
        },
    );

    surface.mount().await.context("Failed to mount surface")?;

    report("getColorScheme", surface.refresh_color_scheme().await);
    report("getDimensions", surface.refresh_dimensions().await);
    let nfc = report("supportNfc", surface.check_nfc().await);

    let started = surface.scan_barcode().await;
    settle(&client, "scanBarcode", started).await?;
    let started = surface.scan_code().await;
    settle(&client, "scanCode", started).await?;
    if nfc == Some(true) {
        let started = surface.read_nfc_tag().await;
        settle(&client, "readNfcTag", started).await?;
    }

    let options = PickImageOptions::new(PickSource::ImageLibrary).media_types(MediaTypes::Images);
    let started = surface.pick_photo(options).await;
    settle(&client, "pickPhoto", started).await?;
    if let Some(uri) = surface.state().photos.first().map(|asset| asset.uri.clone()) {
        let started = surface.edit_photo(EditPhotoOptions::new(uri)).await;
        settle(&client, "editPhoto", started).await?;
    }

    if let Some(table) = config.payload.tables.first() {
        report("query", surface.query(&QueryInput::table(table.as_str())).await);
    }

    Ok(surface.state())
}

fn report<T>(action: &str, result: Result<T, SurfaceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            println!("  {action}: {e}");
            None
        }
    }
}

/// Deliver the result event of a started call.
async fn settle(
    client: &BridgeClient<MockHost>,
    action: &str,
    started: Result<CorrelationId, SurfaceError>,
) -> Result<(), ClientError> {
    if report(action, started).is_some() {
        client.dispatch_next().await?;
    }
    Ok(())
}

/// Run the demo command.
pub async fn run(config: &Config) -> Result<()> {
    println!("=== webbridge demo ===");
    println!();

    let state = exercise(config).await?;

    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("Failed to encode surface state")?
    );
    Ok(())
}
