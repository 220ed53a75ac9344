//! The closed set of host operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::WireError;

/// A remote procedure exposed by the host.
///
/// Serialized as its camelCase wire name (`getColorScheme`, `readNfcTag`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Query a table synced to the host
    Query,
    /// Read the host color scheme
    GetColorScheme,
    /// Read scaled window metrics
    GetDimensions,
    /// Start a barcode scan
    ScanBarcode,
    /// Start a generic code scan (QR, barcode, ...)
    ScanCode,
    /// Check for NFC hardware
    SupportNfc,
    /// Start reading an NFC tag
    ReadNfcTag,
    /// Open the camera or image library
    PickPhoto,
    /// Open the photo editor
    EditPhoto,
    /// Push the sync payload
    SetSyncPayload,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 10] = [
        Operation::Query,
        Operation::GetColorScheme,
        Operation::GetDimensions,
        Operation::ScanBarcode,
        Operation::ScanCode,
        Operation::SupportNfc,
        Operation::ReadNfcTag,
        Operation::PickPhoto,
        Operation::EditPhoto,
        Operation::SetSyncPayload,
    ];

    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Query => "query",
            Operation::GetColorScheme => "getColorScheme",
            Operation::GetDimensions => "getDimensions",
            Operation::ScanBarcode => "scanBarcode",
            Operation::ScanCode => "scanCode",
            Operation::SupportNfc => "supportNfc",
            Operation::ReadNfcTag => "readNfcTag",
            Operation::PickPhoto => "pickPhoto",
            Operation::EditPhoto => "editPhoto",
            Operation::SetSyncPayload => "setSyncPayload",
        }
    }

    /// Name of the event that carries this operation's result.
    ///
    /// Only operations that resolve with a correlation id have one; the
    /// rest resolve with their result directly.
    pub fn result_event(&self) -> Option<&'static str> {
        match self {
            Operation::ScanBarcode => Some("scanBarcodeResult"),
            Operation::ScanCode => Some("scanCodeResult"),
            Operation::ReadNfcTag => Some("readNfcTagResult"),
            Operation::PickPhoto => Some("pickPhotoResult"),
            Operation::EditPhoto => Some("editPhotoResult"),
            _ => None,
        }
    }

    /// Find the operation whose result event has the given name.
    pub fn from_result_event(event: &str) -> Option<Operation> {
        Self::ALL
            .into_iter()
            .find(|op| op.result_event() == Some(event))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| WireError::UnknownOperation(s.to_string()))
    }
}
