//! CLI command implementations.

pub mod call;
pub mod decode;
pub mod demo;
pub mod payload;
