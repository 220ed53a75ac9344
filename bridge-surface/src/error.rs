//! Error types for webbridge-surface.
//!
//! Every lower-layer failure flattens to one human-readable message. The
//! surface only needs to know that a call did not complete.

use thiserror::Error;
use webbridge_client::ClientError;

/// Errors from surface actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// A bridge call did not complete.
    #[error("call failed: {0}")]
    CallFailed(String),
}

impl From<ClientError> for SurfaceError {
    fn from(err: ClientError) -> Self {
        SurfaceError::CallFailed(err.to_string())
    }
}
