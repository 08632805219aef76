//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod config_server;

pub use config_server::{ConfigServerConfig, UaaConfig, TOKEN_ENV_VAR};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "placebind.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "PLACEBIND_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "PLACEBIND";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "PLACEBIND_LOG";

use serde::Deserialize;

use crate::storage::StorageConfig;
use crate::utils::retry::RetryConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Config server URL not configured")]
    MissingUrl,

    #[error("Invalid config server URL '{0}': {1}")]
    InvalidUrl(String, String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config server connection.
    pub config_server: ConfigServerConfig,
    /// Binding storage.
    pub storage: StorageConfig,
    /// Connection and authorization retry budgets.
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `placebind.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }
}
