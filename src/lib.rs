//! Placebind - config server client and placeholder binding store
//!
//! Resolves manifest placeholders against a config server, retrying
//! connectivity and authorization failures independently, and records each
//! name -> id binding under the deployment's current placeholder generation.

pub mod config;
pub mod config_server;
pub mod interfaces;
pub mod placeholder;
pub mod storage;
pub mod utils;
