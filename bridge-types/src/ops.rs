//! Typed operation contracts.
//!
//! Each marker type in this module pins an [`Operation`] to its declared
//! input and output shapes, so a client can encode the input and validate
//! the host's reply without duck typing.
//!
//! Operations whose real result arrives later implement [`ResultOperation`]:
//! the call itself resolves with a [`CorrelationId`], and the result is
//! delivered by the `{operation}Result` event.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    ColorScheme, CorrelationId, EditPhotoOptions, NfcTagResult, Operation, PhotoResult,
    PickImageOptions, QueryInput, QueryOutput, ScaledSize, ScanResult, SyncPayload,
};

/// Input shape for operations that take no arguments (`{}` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoInput {}

/// A remote-callable operation with declared input and output shapes.
pub trait BridgeOperation {
    /// Which operation this is.
    const OPERATION: Operation;
    /// Declared input shape.
    type Input: Serialize + Send + Sync;
    /// Declared output shape.
    type Output: DeserializeOwned + Send;
}

/// An operation that resolves with a correlation id and reports its result
/// through an event.
pub trait ResultOperation: BridgeOperation<Output = CorrelationId> {
    /// Body of the result event.
    type Result: DeserializeOwned + Send;

    /// Name of the result event.
    fn result_event() -> &'static str;
}

/// Payload of a `…Result` event: the correlation id of the originating call
/// (when the host echoes it) plus the operation-specific body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    /// Correlation id of the originating call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    /// Operation-specific body
    #[serde(flatten)]
    pub body: T,
}

macro_rules! operation {
    ($(#[$doc:meta])* $name:ident, $op:ident, $input:ty => $output:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl BridgeOperation for $name {
            const OPERATION: Operation = Operation::$op;
            type Input = $input;
            type Output = $output;
        }
    };
}

macro_rules! result_operation {
    ($(#[$doc:meta])* $name:ident, $op:ident, $event:literal, $input:ty => $result:ty) => {
        operation!($(#[$doc])* $name, $op, $input => CorrelationId);

        impl ResultOperation for $name {
            type Result = $result;

            fn result_event() -> &'static str {
                $event
            }
        }
    };
}

operation!(
    /// `query(input) → rows`
    Query, Query, QueryInput => QueryOutput
);
operation!(
    /// `getColorScheme() → light | dark | unset`
    GetColorScheme, GetColorScheme, NoInput => ColorScheme
);
operation!(
    /// `getDimensions() → {width, height}`
    GetDimensions, GetDimensions, NoInput => ScaledSize
);
operation!(
    /// `supportNfc() → bool`
    SupportNfc, SupportNfc, NoInput => bool
);
operation!(
    /// `setSyncPayload(payload) → void`
    SetSyncPayload, SetSyncPayload, SyncPayload => ()
);
result_operation!(
    /// `scanBarcode() → id`, result via `scanBarcodeResult`
    ScanBarcode, ScanBarcode, "scanBarcodeResult", NoInput => ScanResult
);
result_operation!(
    /// `scanCode() → id`, result via `scanCodeResult`
    ScanCode, ScanCode, "scanCodeResult", NoInput => ScanResult
);
result_operation!(
    /// `readNfcTag() → id`, result via `readNfcTagResult`
    ReadNfcTag, ReadNfcTag, "readNfcTagResult", NoInput => NfcTagResult
);
result_operation!(
    /// `pickPhoto(options) → id`, result via `pickPhotoResult`
    PickPhoto, PickPhoto, "pickPhotoResult", PickImageOptions => PhotoResult
);
result_operation!(
    /// `editPhoto(options) → id`, result via `editPhotoResult`
    EditPhoto, EditPhoto, "editPhotoResult", EditPhotoOptions => PhotoResult
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_input_is_empty_object() {
        assert_eq!(serde_json::to_value(NoInput {}).unwrap(), json!({}));
    }

    #[test]
    fn result_operations_use_result_events() {
        fn check<O: ResultOperation>() {
            assert_eq!(O::OPERATION.result_event(), Some(O::result_event()));
        }
        check::<ScanBarcode>();
        check::<ScanCode>();
        check::<ReadNfcTag>();
        check::<PickPhoto>();
        check::<EditPhoto>();
    }

    #[test]
    fn markers_bind_operations() {
        assert_eq!(SupportNfc::OPERATION, Operation::SupportNfc);
        assert_eq!(SetSyncPayload::OPERATION, Operation::SetSyncPayload);
        assert_eq!(Query::OPERATION, Operation::Query);
    }

    #[test]
    fn result_payload_without_id() {
        let result: OperationResult<NfcTagResult> =
            serde_json::from_value(json!({"value": "04A3F2"})).unwrap();
        assert_eq!(result.id, None);
        assert_eq!(result.body.value, "04A3F2");
    }

    #[test]
    fn result_payload_with_id() {
        let id = CorrelationId::new();
        let result: OperationResult<ScanResult> = serde_json::from_value(
            json!({"id": id.to_string(), "value": "ABC-123", "format": "code128"}),
        )
        .unwrap();
        assert_eq!(result.id, Some(id));
        assert_eq!(result.body.format.as_deref(), Some("code128"));
    }

    #[test]
    fn void_output_accepts_null() {
        let result: Result<<SetSyncPayload as BridgeOperation>::Output, _> =
            serde_json::from_value(json!(null));
        assert!(result.is_ok());
    }
}
