//! Config server client stack.
//!
//! Layers, innermost first:
//! - `HttpConfigServerClient`: one HTTPS call per operation
//! - `RetryableConfigServerClient`: connection and authorization retries
//! - `DeploymentConfigServerClient`: records name bindings per generation

pub mod auth;
pub mod deployment_client;
pub mod http_client;
pub mod retryable;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use auth::StaticTokenProvider;
pub use deployment_client::DeploymentConfigServerClient;
pub use http_client::HttpConfigServerClient;
pub use retryable::RetryableConfigServerClient;

use std::sync::Arc;

use crate::config::Config;
use crate::interfaces::{CredentialProvider, TransportError};
use crate::placeholder::PlaceholderManager;

/// The full resilient, recording client for one deployment.
pub type DeploymentClient = DeploymentConfigServerClient<RetryableConfigServerClient<HttpConfigServerClient>>;

/// Build the full client stack for `placeholders`' deployment.
pub fn build_deployment_client(
    config: &Config,
    credentials: Arc<dyn CredentialProvider>,
    placeholders: PlaceholderManager,
) -> Result<DeploymentClient, TransportError> {
    let transport = HttpConfigServerClient::new(&config.config_server, credentials)?;
    let retrying = RetryableConfigServerClient::with_config(transport, config.retry);
    Ok(DeploymentConfigServerClient::new(retrying, placeholders))
}
