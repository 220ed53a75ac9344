//! Photo option layering.
//!
//! Photo options are sent as the fixed defaults overlaid with the caller's
//! options. Layering uses [`Setting::overlay`]: a field the caller leaves
//! absent takes the default, a field the caller explicitly unsets stays
//! unset, even if later partial updates are layered on top.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use webbridge_types::{CameraType, EditPhotoOptions, PickImageOptions, Setting};

/// Invalid photo options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// `type` (camera or image library) was not chosen
    #[error("pick options need a source (camera or imageLibrary)")]
    MissingSource,

    /// Quality outside `0.0..=1.0`
    #[error("quality {0} is outside 0.0..=1.0")]
    QualityOutOfRange(f32),

    /// `editPhoto` without an image
    #[error("edit options need an image uri")]
    MissingUri,
}

/// Fixed defaults merged into every photo request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickDefaults {
    /// Camera to open.
    #[serde(default = "default_camera_type")]
    pub camera_type: CameraType,
    /// JPEG quality in `0.0..=1.0`.
    #[serde(default = "default_quality")]
    pub quality: f32,
    /// Sticker asset names offered by the full editor.
    #[serde(default)]
    pub stickers: Vec<String>,
}

fn default_camera_type() -> CameraType {
    CameraType::Back
}

fn default_quality() -> f32 {
    1.0
}

impl Default for PickDefaults {
    fn default() -> Self {
        Self {
            camera_type: default_camera_type(),
            quality: default_quality(),
            stickers: Vec::new(),
        }
    }
}

impl PickDefaults {
    /// The defaults as the bottom layer of a pick request.
    pub fn as_pick_layer(&self) -> PickImageOptions {
        PickImageOptions {
            camera_type: Setting::Value(self.camera_type),
            quality: Setting::Value(self.quality),
            stickers: Setting::Value(self.stickers.clone()),
            ..PickImageOptions::default()
        }
    }
}

/// Overlay `options` on `defaults` and validate the result.
pub fn merge_pick_options(
    defaults: &PickDefaults,
    options: PickImageOptions,
) -> Result<PickImageOptions, OptionsError> {
    let merged = defaults.as_pick_layer().overlay(options);
    if !merged.source.is_value() {
        return Err(OptionsError::MissingSource);
    }
    check_quality(&merged.quality)?;
    Ok(merged)
}

/// Overlay `options` on `defaults` for an edit request and validate it.
pub fn merge_edit_options(
    defaults: &PickDefaults,
    options: EditPhotoOptions,
) -> Result<EditPhotoOptions, OptionsError> {
    if options.uri.trim().is_empty() {
        return Err(OptionsError::MissingUri);
    }
    let merged = EditPhotoOptions {
        quality: Setting::Value(defaults.quality).overlay(options.quality),
        stickers: Setting::Value(defaults.stickers.clone()).overlay(options.stickers),
        ..options
    };
    check_quality(&merged.quality)?;
    Ok(merged)
}

fn check_quality(quality: &Setting<f32>) -> Result<(), OptionsError> {
    match quality.value() {
        Some(q) if !(0.0..=1.0).contains(q) => Err(OptionsError::QualityOutOfRange(*q)),
        _ => Ok(()),
    }
}
