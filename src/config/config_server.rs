//! Config server connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::ConfigError;

/// Environment variable holding a pre-issued bearer token.
pub const TOKEN_ENV_VAR: &str = "PLACEBIND_CONFIG_SERVER_TOKEN";

/// Per-request timeout when none (or zero) is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the config server lives and how to trust it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigServerConfig {
    /// Base URL, e.g. `https://config-server.internal:8080`.
    pub url: String,
    /// PEM CA bundle to pin. Missing or blank falls back to the platform trust store.
    pub ca_cert_path: Option<PathBuf>,
    /// Identity provider the bearer token comes from.
    pub uaa: UaaConfig,
    /// Per-request connect/read timeout. Zero means `DEFAULT_TIMEOUT_SECS`.
    pub timeout_secs: u64,
    /// Pre-issued bearer token. Usually supplied via `TOKEN_ENV_VAR` instead.
    pub token: Option<String>,
}

impl Default for ConfigServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ca_cert_path: None,
            uaa: UaaConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ConfigServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Parse the base URL, normalized to end in `/` so relative joins keep any path prefix.
    pub fn base_url(&self) -> Result<reqwest::Url, ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let mut raw = self.url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        reqwest::Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(self.url.clone(), e.to_string()))
    }
}

/// UAA (identity provider) settings for obtaining config server tokens.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UaaConfig {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
    pub ca_cert_path: Option<PathBuf>,
}
