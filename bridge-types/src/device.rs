//! Device capability shapes: color scheme, window metrics, scanning, NFC.

use serde::{Deserialize, Serialize};

/// Host color scheme.
///
/// On the wire: `"light"`, `"dark"`, or `null` when the host has no preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<SchemeName>", into = "Option<SchemeName>")]
pub enum ColorScheme {
    /// Light appearance
    Light,
    /// Dark appearance
    Dark,
    /// No preference reported
    Unset,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SchemeName {
    Light,
    Dark,
}

impl From<Option<SchemeName>> for ColorScheme {
    fn from(name: Option<SchemeName>) -> Self {
        match name {
            Some(SchemeName::Light) => ColorScheme::Light,
            Some(SchemeName::Dark) => ColorScheme::Dark,
            None => ColorScheme::Unset,
        }
    }
}

impl From<ColorScheme> for Option<SchemeName> {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Some(SchemeName::Light),
            ColorScheme::Dark => Some(SchemeName::Dark),
            ColorScheme::Unset => None,
        }
    }
}

/// Scaled window metrics reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledSize {
    /// Width in density-independent pixels
    pub width: f64,
    /// Height in density-independent pixels
    pub height: f64,
    /// Pixel density ratio
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// User font scale
    #[serde(default = "unit_scale")]
    pub font_scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl ScaledSize {
    /// Metrics with unit scale factors.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            font_scale: 1.0,
        }
    }
}

/// Body of a `scanBarcodeResult` / `scanCodeResult` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Decoded content
    pub value: String,
    /// Symbology, when the host reports it (`qr`, `ean-13`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Body of a `readNfcTagResult` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfcTagResult {
    /// Tag content as reported by the host (typically the hex UID)
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn color_scheme_wire_values() {
        assert_eq!(serde_json::to_value(ColorScheme::Dark).unwrap(), json!("dark"));
        assert_eq!(serde_json::to_value(ColorScheme::Unset).unwrap(), json!(null));

        let light: ColorScheme = serde_json::from_value(json!("light")).unwrap();
        let unset: ColorScheme = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(light, ColorScheme::Light);
        assert_eq!(unset, ColorScheme::Unset);
    }

    #[test]
    fn color_scheme_rejects_other_strings() {
        assert!(serde_json::from_value::<ColorScheme>(json!("sepia")).is_err());
        assert!(serde_json::from_value::<ColorScheme>(json!(1)).is_err());
    }

    #[test]
    fn scaled_size_defaults_scale() {
        let size: ScaledSize = serde_json::from_value(json!({"width": 390, "height": 844})).unwrap();
        assert_eq!(size, ScaledSize::new(390.0, 844.0));
    }

    #[test]
    fn scaled_size_reads_camel_case() {
        let size: ScaledSize = serde_json::from_value(
            json!({"width": 390, "height": 844, "scale": 3, "fontScale": 1.2}),
        )
        .unwrap();
        assert_eq!(size.scale, 3.0);
        assert_eq!(size.font_scale, 1.2);
    }

    #[test]
    fn scaled_size_requires_width_and_height() {
        assert!(serde_json::from_value::<ScaledSize>(json!({"width": 390})).is_err());
    }

    #[test]
    fn scan_result_format_optional() {
        let scan: ScanResult = serde_json::from_value(json!({"value": "4006381333931"})).unwrap();
        assert_eq!(scan.format, None);
    }
}
