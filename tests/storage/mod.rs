//! Shared storage integration tests.
//!
//! Tests the BindingStore and DeploymentStore interfaces against all implementations.
//! Each implementation module imports these test functions and runs them.

pub mod binding_store_tests;
pub mod deployment_store_tests;
