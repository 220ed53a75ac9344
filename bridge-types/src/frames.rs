//! Frames exchanged with the host bridge runtime.
//!
//! The host exposes two channels:
//! - a request channel: one [`Request`] in, exactly one [`Reply`] out
//! - an event channel: [`HostEvent`]s at arbitrary times, zero or more times
//!
//! All frames are JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Operation;

/// A call crossing from the web surface to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Operation to invoke
    pub operation: Operation,
    /// Input conforming to the operation's declared shape
    pub input: Value,
}

impl Request {
    /// Create a new request.
    pub fn new(operation: Operation, input: Value) -> Self {
        Self { operation, input }
    }
}

/// Why the host refused or failed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Host does not implement the operation
    UnknownOperation,
    /// Host declares the capability absent (e.g. no NFC hardware)
    Unsupported,
    /// The user aborted the host-side flow
    Cancelled,
    /// The user or OS denied a permission
    PermissionDenied,
    /// Anything else
    Internal,
}

/// Failure body of a [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Optional human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The host's single answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    /// The operation completed with a value
    #[serde(rename = "ok")]
    Value {
        /// Output of the operation (`null` for void operations)
        value: Value,
    },
    /// The operation failed
    #[serde(rename = "error")]
    Failure(HostFailure),
}

impl Reply {
    /// A successful reply.
    pub fn ok(value: Value) -> Self {
        Reply::Value { value }
    }

    /// A failed reply.
    pub fn failure(kind: FailureKind, message: Option<String>) -> Self {
        Reply::Failure(HostFailure {
            kind,
            message,
        })
    }
}

/// An unsolicited host-to-surface notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    /// Event name (e.g. `readNfcTagResult`)
    pub name: String,
    /// Event-specific payload
    pub payload: Value,
}

impl HostEvent {
    /// Create a new event.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// The operation this event reports a result for, if any.
    pub fn result_of(&self) -> Option<Operation> {
        Operation::from_result_event(&self.name)
    }
}
