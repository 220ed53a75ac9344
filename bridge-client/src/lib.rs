//! # webbridge-client
//!
//! Client library for the webbridge host/webview bridge.
//!
//! A web surface running inside a native host talks to it through two
//! channels: request/reply calls and unsolicited named events. This crate
//! wraps both in one typed proxy.
//!
//! ## Features
//!
//! - **Typed Calls**: every operation has declared input and output shapes;
//!   replies that do not fit are rejected
//! - **Additive Subscriptions**: any number of listeners per event, invoked
//!   in registration order, each removable on its own
//! - **Correlated Results**: operations that finish later resolve with a
//!   correlation id and deliver their result as a `…Result` event
//! - **Transport Abstraction**: the host is injected ([`HostTransport`]);
//!   [`MockHost`] scripts one for tests
//!
//! ## Example
//!
//! ```ignore
//! use webbridge_client::{BridgeClient, MockHost};
//!
//! let client = Arc::new(BridgeClient::new(MockHost::new()));
//!
//! let sub = client.subscribe("readNfcTagResult", |payload| println!("tag: {payload}"));
//! let id = client.read_nfc_tag().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod subscription;
pub mod transport;

pub use client::{BridgeClient, ClientConfig, ClientError};
pub use subscription::{Handler, Subscription};
pub use transport::{HostTransport, MockHost, TransportError};
