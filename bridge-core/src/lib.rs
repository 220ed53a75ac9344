//! # webbridge-core
//!
//! Pure logic for webbridge (no I/O, instant tests).
//!
//! This crate holds the parts of the bridge that do not touch the host:
//! the event listener registry, correlation of result events with the calls
//! that started them, layering of photo options over fixed defaults, and the
//! sync payload builder and version-limited decoder.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure**: they take input and produce output
//! without side effects. The actual host I/O is performed by `webbridge-client`,
//! which drives these structures from its request and event channels.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod listeners;
pub mod options;
pub mod payload;
pub mod results;

pub use listeners::{ListenerId, ListenerRegistry};
pub use options::{merge_edit_options, merge_pick_options, OptionsError, PickDefaults};
pub use payload::{build_current_payload, PayloadConfig, PayloadDecoder};
pub use results::{Completion, ResultTracker, DEFAULT_MAX_PARKED};
