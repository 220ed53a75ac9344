//! Error types for the bridge wire contract.

use thiserror::Error;

/// Errors raised while encoding or decoding bridge frames.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Operation name not in the closed operation set
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Sync payload could not be decoded
    #[error("sync payload error: {0}")]
    Payload(#[from] PayloadError),
}

/// Errors raised while decoding a versioned sync payload.
///
/// Decoding always fails closed: a payload is either fully understood or
/// rejected, never partially read.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// `version` is absent or not a non-negative integer
    #[error("sync payload has no integer version")]
    MissingVersion,

    /// `version` is higher than the receiver implements (or zero)
    #[error("unsupported sync payload version {found} (highest known: {max})")]
    UnsupportedVersion {
        /// Version found on the wire.
        found: u64,
        /// Highest version the receiver implements.
        max: u8,
    },

    /// Known version, but the field set does not match its declared shape
    #[error("malformed sync payload v{version}: {source}")]
    Malformed {
        /// Version the payload claimed.
        version: u8,
        /// Underlying shape error.
        #[source]
        source: serde_json::Error,
    },

    /// Payload is not a JSON object
    #[error("sync payload must be a JSON object")]
    NotAnObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WireError::UnknownOperation("launchRocket".into());
        assert_eq!(err.to_string(), "unknown operation: launchRocket");

        let err = PayloadError::UnsupportedVersion { found: 3, max: 2 };
        assert_eq!(
            err.to_string(),
            "unsupported sync payload version 3 (highest known: 2)"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
        assert_send_sync::<PayloadError>();
    }
}
