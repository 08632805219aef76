//! Static bearer token credentials.

use async_trait::async_trait;

use crate::config::{ConfigServerConfig, TOKEN_ENV_VAR};
use crate::interfaces::{CredentialError, CredentialProvider};

/// Hands out a fixed, pre-issued bearer token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Token from the config file, else from `TOKEN_ENV_VAR`.
    pub fn from_config(config: &ConfigServerConfig) -> Result<Self, CredentialError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or(CredentialError::Missing)?;
        Ok(Self::new(token))
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn auth_header(&self) -> Result<String, CredentialError> {
        Ok(format!("Bearer {}", self.token))
    }
}
