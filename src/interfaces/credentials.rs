//! Bearer credential provider interface.

use async_trait::async_trait;

/// Errors from a credential provider.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No token configured")]
    Missing,

    #[error("Token request failed: {0}")]
    Request(String),
}

/// Produces the current `Authorization` header value on demand.
///
/// Called once per physical attempt, so a provider that refreshes expired
/// tokens lets the authorization retry pick up fresh credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn auth_header(&self) -> Result<String, CredentialError>;
}
