//! # webbridge-types
//!
//! Wire contract for the webbridge host/webview bridge.
//!
//! This crate provides the foundational types shared by every webbridge crate:
//! - [`Operation`] - the closed set of remote-callable host operations
//! - [`Request`], [`Reply`], [`HostEvent`] - the frames crossing the host boundary
//! - [`CorrelationId`] - matches an asynchronous result event to its call
//! - [`BridgeOperation`] - typed input/output shape per operation
//! - [`SyncPayload`] - the versioned configuration pushed to the host
//! - [`WireError`], [`PayloadError`] - error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod device;
mod error;
mod frames;
mod ids;
mod media;
mod operation;
pub mod ops;
mod payload;
mod query;
mod setting;

pub use device::{ColorScheme, NfcTagResult, ScaledSize, ScanResult};
pub use error::{PayloadError, WireError};
pub use frames::{FailureKind, HostEvent, HostFailure, Reply, Request};
pub use ids::CorrelationId;
pub use media::{
    CameraType, EditPhotoOptions, EditingType, ImageAsset, MediaTypes, PhotoResult,
    PickImageOptions, PickSource,
};
pub use operation::Operation;
pub use ops::{BridgeOperation, NoInput, OperationResult, ResultOperation};
pub use payload::{SyncPayload, SyncPayloadV1, SyncPayloadV2, LATEST_PAYLOAD_VERSION};
pub use query::{QueryInput, QueryOutput};
pub use setting::Setting;
