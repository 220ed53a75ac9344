//! Photo picking and editing shapes.

use serde::{Deserialize, Serialize};

use crate::Setting;

/// Where the host should take the photo from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickSource {
    /// Launch the camera
    Camera,
    /// Open the image library
    ImageLibrary,
}

/// Post-capture editor to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingType {
    /// The OS crop/rotate editor
    Native,
    /// The host's full editor (stickers, drawing)
    Full,
}

/// Media kinds offered by the library picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTypes {
    /// Photos and videos
    All,
    /// Photos only
    Images,
    /// Videos only
    Videos,
}

/// Camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraType {
    /// Rear camera
    Back,
    /// Selfie camera
    Front,
}

/// Options for `pickPhoto`.
///
/// Every field is a [`Setting`] so option objects can be layered: fixed
/// defaults first, then the caller's options, then later partial updates.
/// An explicitly unset field stays unset through every later layer that
/// does not mention it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickImageOptions {
    /// Camera or image library
    #[serde(rename = "type", default, skip_serializing_if = "Setting::is_unspecified")]
    pub source: Setting<PickSource>,
    /// Editor to present after picking
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub editing_type: Setting<EditingType>,
    /// Allow picking several images
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub allows_multiple_selection: Setting<bool>,
    /// Include base64 data in the result
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub base64: Setting<bool>,
    /// Media kinds to offer
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub media_types: Setting<MediaTypes>,
    /// Camera to open
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub camera_type: Setting<CameraType>,
    /// JPEG quality in `0.0..=1.0`
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub quality: Setting<f32>,
    /// Sticker asset names offered by the full editor
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub stickers: Setting<Vec<String>>,
}

impl PickImageOptions {
    /// Options picking from `source`, everything else absent.
    pub fn new(source: PickSource) -> Self {
        Self {
            source: Setting::Value(source),
            ..Self::default()
        }
    }

    /// Set the editor.
    pub fn editing_type(mut self, editing_type: impl Into<Setting<EditingType>>) -> Self {
        self.editing_type = editing_type.into();
        self
    }

    /// Set multiple selection.
    pub fn allows_multiple_selection(mut self, allow: impl Into<Setting<bool>>) -> Self {
        self.allows_multiple_selection = allow.into();
        self
    }

    /// Set base64 output.
    pub fn base64(mut self, base64: impl Into<Setting<bool>>) -> Self {
        self.base64 = base64.into();
        self
    }

    /// Set media kinds.
    pub fn media_types(mut self, media_types: impl Into<Setting<MediaTypes>>) -> Self {
        self.media_types = media_types.into();
        self
    }

    /// Layer `later` on top of these options, field by field.
    pub fn overlay(self, later: PickImageOptions) -> PickImageOptions {
        PickImageOptions {
            source: self.source.overlay(later.source),
            editing_type: self.editing_type.overlay(later.editing_type),
            allows_multiple_selection: self
                .allows_multiple_selection
                .overlay(later.allows_multiple_selection),
            base64: self.base64.overlay(later.base64),
            media_types: self.media_types.overlay(later.media_types),
            camera_type: self.camera_type.overlay(later.camera_type),
            quality: self.quality.overlay(later.quality),
            stickers: self.stickers.overlay(later.stickers),
        }
    }
}

/// Options for `editPhoto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPhotoOptions {
    /// Image to edit (a `uri` from a previous pick)
    pub uri: String,
    /// Editor to present
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub editing_type: Setting<EditingType>,
    /// Include base64 data in the result
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub base64: Setting<bool>,
    /// JPEG quality in `0.0..=1.0`
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub quality: Setting<f32>,
    /// Sticker asset names offered by the full editor
    #[serde(default, skip_serializing_if = "Setting::is_unspecified")]
    pub stickers: Setting<Vec<String>>,
}

impl EditPhotoOptions {
    /// Edit the image at `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            editing_type: Setting::Absent,
            base64: Setting::Absent,
            quality: Setting::Absent,
            stickers: Setting::Absent,
        }
    }

    /// Set the editor.
    pub fn editing_type(mut self, editing_type: impl Into<Setting<EditingType>>) -> Self {
        self.editing_type = editing_type.into();
        self
    }
}

/// One picked or edited image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// File name on the device
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Asset type as reported by the host
    #[serde(rename = "type")]
    pub kind: String,
    /// MIME type
    pub mime_type: String,
    /// Local URI usable by the web surface
    pub uri: String,
    /// Image data, when `base64` was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl std::fmt::Display for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}x{}, {} bytes, {})",
            self.file_name, self.width, self.height, self.file_size, self.mime_type
        )
    }
}

/// Body of a `pickPhotoResult` / `editPhotoResult` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoResult {
    /// One or more images
    pub assets: Vec<ImageAsset>,
}
