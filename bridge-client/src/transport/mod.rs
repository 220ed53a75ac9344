//! Transport abstraction for the host bridge runtime.
//!
//! The host is an external collaborator. This module only fixes the
//! two-channel contract it has to satisfy, so the client can be driven by a
//! real webview host or by [`MockHost`] in tests.
//!
//! # Design
//!
//! - `request()` sends one [`Request`] and resolves with exactly one [`Reply`]
//! - `recv_event()` yields the next unsolicited [`HostEvent`]
//! - `is_available()` reports whether the host channel is up
//!
//! Serialization and the transport medium are the implementation's business.
//!
//! # Example
//!
//! ```ignore
//! let host = MockHost::new();
//! host.respond(Operation::SupportNfc, json!(true));
//! let reply = host.request(Request::new(Operation::SupportNfc, json!({}))).await?;
//! ```

mod mock;

pub use mock::MockHost;

use async_trait::async_trait;
use thiserror::Error;
use webbridge_types::{HostEvent, Reply, Request};

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Host channel not available.
    #[error("host unavailable")]
    Unavailable,

    /// Event channel closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Request could not be delivered.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Reply or event could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Host did not answer in time.
    #[error("host timeout")]
    Timeout,
}

/// The host bridge runtime as seen from the web surface.
///
/// Implementations must allow concurrent `request()` calls; each call is
/// independent and may complete in any order relative to the others.
#[async_trait]
pub trait HostTransport: Send + Sync {
    /// Send a request and wait for its single reply.
    async fn request(&self, request: Request) -> Result<Reply, TransportError>;

    /// Receive the next host event.
    ///
    /// Waits until an event is available. Returns
    /// [`TransportError::ConnectionClosed`] once the event channel is closed.
    async fn recv_event(&self) -> Result<HostEvent, TransportError>;

    /// Check if the host channel is up.
    fn is_available(&self) -> bool;
}
