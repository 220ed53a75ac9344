//! What the demo page shows.

use serde::Serialize;
use std::collections::VecDeque;
use serde_json::{Map, Value};
use webbridge_types::{
    ColorScheme, CorrelationId, ImageAsset, NfcTagResult, Operation, ScaledSize, ScanResult,
};

// Results remembered for calls whose reply has not been seen yet.
const EARLY_RESULT_LIMIT: usize = 16;

/// A call whose result event has not arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingCall {
    /// Operation that was started
    pub operation: Operation,
    /// Correlation id the host returned
    pub id: CorrelationId,
}

/// Everything the surface has learned from the host so far.
///
/// `None` means "not asked yet" (or the last attempt failed).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceState {
    /// Set once the sync payload was accepted by the host
    pub payload_pushed: bool,
    /// Host color scheme
    pub color_scheme: Option<ColorScheme>,
    /// Scaled window metrics
    pub dimensions: Option<ScaledSize>,
    /// NFC capability check
    pub nfc_supported: Option<bool>,
    /// Most recent barcode or code scan
    pub last_scan: Option<ScanResult>,
    /// Most recent NFC tag
    pub last_tag: Option<NfcTagResult>,
    /// Assets of the most recent photo pick or edit
    pub photos: Vec<ImageAsset>,
    /// Rows of the most recent query
    pub rows: Vec<Map<String, Value>>,
    /// Started calls still waiting for their result event
    pub pending: Vec<PendingCall>,
    /// Message of the most recent failed action
    pub last_error: Option<String>,
    #[serde(skip)]
    settled_early: VecDeque<CorrelationId>,
}

impl SurfaceState {
    /// Record a started call, unless its result already arrived.
    pub(crate) fn start(&mut self, operation: Operation, id: CorrelationId) {
        if let Some(pos) = self.settled_early.iter().position(|early| *early == id) {
            self.settled_early.remove(pos);
            return;
        }
        self.pending.push(PendingCall { operation, id });
    }

    /// Drop the pending entry for a finished call.
    ///
    /// Results without an id settle the oldest pending call of the same
    /// operation. A result whose id is not pending yet is remembered so the
    /// matching `start` does not leave a stale entry.
    pub(crate) fn settle(&mut self, operation: Operation, id: Option<CorrelationId>) {
        let pos = match id {
            Some(id) => self.pending.iter().position(|p| p.id == id),
            None => self.pending.iter().position(|p| p.operation == operation),
        };
        match (pos, id) {
            (Some(pos), _) => {
                self.pending.remove(pos);
            }
            (None, Some(id)) => {
                if self.settled_early.len() >= EARLY_RESULT_LIMIT {
                    self.settled_early.pop_front();
                }
                self.settled_early.push_back(id);
            }
            (None, None) => {}
        }
    }

    /// True if a call of `operation` is waiting for its result.
    pub fn is_pending(&self, operation: Operation) -> bool {
        self.pending.iter().any(|p| p.operation == operation)
    }
}
