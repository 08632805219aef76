//! Shared utilities.
//!
//! Tracing bootstrap and the retry wrapper used by the config server client.

pub mod bootstrap;
pub mod retry;
