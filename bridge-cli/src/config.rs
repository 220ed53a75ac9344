//! Configuration loading for webbridge.
//!
//! Configuration is loaded from a TOML file (default: `webbridge.toml`).
//! Every section and every field is optional.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use webbridge_client::{ClientConfig, MockHost};
use webbridge_core::{PayloadConfig, PickDefaults};
use webbridge_types::{ColorScheme, FailureKind, Operation};

/// Root configuration for webbridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Assets announced to the host.
    #[serde(default)]
    pub payload: PayloadConfig,
    /// Defaults merged into photo requests.
    #[serde(default)]
    pub photo: PickDefaults,
    /// Replies of the scripted host.
    #[serde(default)]
    pub host: HostScript,
    /// Client tuning.
    #[serde(default)]
    pub client: ClientSection,
}

/// What the scripted host answers.
#[derive(Debug, Clone, Deserialize)]
pub struct HostScript {
    /// `light`, `dark` or `unset` (default: light).
    #[serde(default = "default_color_scheme")]
    pub color_scheme: HostColorScheme,
    /// Window width (default: 390).
    #[serde(default = "default_width")]
    pub width: f64,
    /// Window height (default: 844).
    #[serde(default = "default_height")]
    pub height: f64,
    /// Pixel density (default: 3).
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Whether the device has NFC (default: true).
    #[serde(default = "default_nfc_supported")]
    pub nfc_supported: bool,
    /// Value delivered by `scanBarcode`.
    #[serde(default = "default_barcode")]
    pub barcode: String,
    /// Value delivered by `scanCode`.
    #[serde(default = "default_code")]
    pub code: String,
    /// Tag delivered by `readNfcTag`.
    #[serde(default = "default_nfc_tag")]
    pub nfc_tag: String,
    /// File name of the picked photo.
    #[serde(default = "default_photo_file")]
    pub photo_file: String,
    /// Rows returned by `query`.
    #[serde(default = "default_rows")]
    pub rows: Vec<Map<String, Value>>,
    /// Operations the host declares unsupported.
    #[serde(default)]
    pub unsupported: Vec<Operation>,
    /// Operations the user cancels.
    #[serde(default)]
    pub cancelled: Vec<Operation>,
    /// Milliseconds between a correlated reply and its result event
    /// (default: 0).
    #[serde(default)]
    pub event_delay_ms: u64,
}

/// Color scheme the scripted host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostColorScheme {
    /// Light appearance
    Light,
    /// Dark appearance
    Dark,
    /// No preference (replies `null`)
    Unset,
}

impl From<HostColorScheme> for ColorScheme {
    fn from(scheme: HostColorScheme) -> Self {
        match scheme {
            HostColorScheme::Light => ColorScheme::Light,
            HostColorScheme::Dark => ColorScheme::Dark,
            HostColorScheme::Unset => ColorScheme::Unset,
        }
    }
}

/// Client tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    /// Seconds to wait for a result event (default: 60).
    #[serde(default = "default_result_timeout_secs")]
    pub result_timeout_secs: u64,
    /// Early results kept per client (default: 64).
    #[serde(default = "default_max_parked_results")]
    pub max_parked_results: usize,
}

// Default value functions
fn default_color_scheme() -> HostColorScheme {
    HostColorScheme::Light
}

fn default_width() -> f64 {
    390.0
}

fn default_height() -> f64 {
    844.0
}

fn default_scale() -> f64 {
    3.0
}

fn default_nfc_supported() -> bool {
    true
}

fn default_barcode() -> String {
    "4006381333931".to_string()
}

fn default_code() -> String {
    "WO-1182".to_string()
}

fn default_nfc_tag() -> String {
    "04A3F2".to_string()
}

fn default_photo_file() -> String {
    "IMG_0001.jpg".to_string()
}

fn default_rows() -> Vec<Map<String, Value>> {
    let rows = [
        json!({"id": 1, "name": "Intake North", "status": "open"}),
        json!({"id": 2, "name": "Pump House 3", "status": "closed"}),
    ];
    rows.into_iter()
        .filter_map(|row| match row {
            Value::Object(fields) => Some(fields),
            _ => None,
        })
        .collect()
}

fn default_result_timeout_secs() -> u64 {
    60
}

fn default_max_parked_results() -> usize {
    64
}

impl Default for HostScript {
    fn default() -> Self {
        Self {
            color_scheme: default_color_scheme(),
            width: default_width(),
            height: default_height(),
            scale: default_scale(),
            nfc_supported: default_nfc_supported(),
            barcode: default_barcode(),
            code: default_code(),
            nfc_tag: default_nfc_tag(),
            photo_file: default_photo_file(),
            rows: default_rows(),
            unsupported: Vec::new(),
            cancelled: Vec::new(),
            event_delay_ms: 0,
        }
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            result_timeout_secs: default_result_timeout_secs(),
            max_parked_results: default_max_parked_results(),
        }
    }
}

impl HostScript {
    fn photo_result(&self, file_name: &str) -> Value {
        json!({
            "assets": [{
                "fileName": file_name,
                "fileSize": 482_133,
                "width": 3024,
                "height": 4032,
                "type": "image",
                "mimeType": "image/jpeg",
                "uri": format!("file:///data/photos/{file_name}")
            }]
        })
    }

    /// A mock host answering every operation as scripted.
    pub fn mock_host(&self) -> MockHost {
        let host = MockHost::new();
        host.set_event_delay(Duration::from_millis(self.event_delay_ms));
        host.respond(Operation::SetSyncPayload, Value::Null);
        host.respond(
            Operation::GetColorScheme,
            json!(ColorScheme::from(self.color_scheme)),
        );
        host.respond(
            Operation::GetDimensions,
            json!({"width": self.width, "height": self.height, "scale": self.scale}),
        );
        host.respond(Operation::SupportNfc, json!(self.nfc_supported));
        host.respond(Operation::Query, json!({ "rows": self.rows }));
        host.respond_with_result(Operation::ScanBarcode, json!({"value": self.barcode}));
        host.respond_with_result(Operation::ScanCode, json!({"value": self.code}));
        host.respond_with_result(Operation::PickPhoto, self.photo_result(&self.photo_file));
        host.respond_with_result(
            Operation::EditPhoto,
            self.photo_result(&format!("edited-{}", self.photo_file)),
        );
        if self.nfc_supported {
            host.respond_with_result(Operation::ReadNfcTag, json!({"value": self.nfc_tag}));
        } else {
            host.fail(Operation::ReadNfcTag, FailureKind::Unsupported);
        }

        for operation in &self.unsupported {
            host.forget(*operation);
            host.fail(*operation, FailureKind::Unsupported);
        }
        for operation in &self.cancelled {
            host.forget(*operation);
            host.fail(*operation, FailureKind::Cancelled);
        }
        host
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` if given, else `webbridge.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = PathBuf::from("webbridge.toml");
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Client configuration from the `[client]` and `[photo]` sections.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_result_timeout(Duration::from_secs(self.client.result_timeout_secs))
            .with_max_parked_results(self.client.max_parked_results)
            .with_photo_defaults(self.photo.clone())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
