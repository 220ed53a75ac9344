//! # webbridge-surface
//!
//! The demo page of the webbridge workspace, minus the page.
//!
//! [`Surface`] wires an injected [`BridgeClient`](webbridge_client::BridgeClient)
//! to the page's actions and keeps what the host returned in a
//! [`SurfaceState`].
//!
//! ## Design
//!
//! - `mount()` pushes the current sync payload once and subscribes to every
//!   `…Result` event
//! - each action records its outcome; results arriving as events update the
//!   state from the listeners
//! - errors flatten to one human-readable [`SurfaceError`]
//! - thin wrappers; all real logic lives in webbridge-client and webbridge-core

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod state;
pub mod surface;

pub use error::SurfaceError;
pub use state::{PendingCall, SurfaceState};
pub use surface::{Surface, SurfaceConfig};
