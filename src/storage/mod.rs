//! Storage implementations.
//!
//! Binding and deployment stores over SQLite or PostgreSQL, plus in-memory
//! mocks for tests.

use std::sync::Arc;

use serde::Deserialize;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
use tracing::info;

pub use crate::interfaces::binding_store::{BindingStore, PlaceholderMapping, Result, StorageError};
pub use crate::interfaces::deployment_store::{
    new_set_id, Deployment, DeploymentStore, INITIAL_SET_ID,
};

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(feature = "postgres")]
pub use sql::postgres::{PostgresBindingStore, PostgresDeploymentStore};
#[cfg(feature = "sqlite")]
pub use sql::sqlite::{SqliteBindingStore, SqliteDeploymentStore};
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{SqlBindingStore, SqlDeploymentStore};

/// Storage type discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Postgres,
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// PostgreSQL-specific configuration.
    pub postgres: PostgresConfig,
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to database file.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "./data/placebind.db".to_string(),
        }
    }
}

/// PostgreSQL-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// PostgreSQL connection URI.
    pub uri: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            uri: "postgres://localhost:5432/placebind".to_string(),
        }
    }
}

/// Handles to both stores, sharing one pool.
#[derive(Clone)]
pub struct Storage {
    pub bindings: Arc<dyn BindingStore>,
    pub deployments: Arc<dyn DeploymentStore>,
}

/// Connect to the configured database, apply migrations and build the stores.
pub async fn init_storage(config: &StorageConfig) -> Result<Storage> {
    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            info!(path = %config.sqlite.path, "Storage: sqlite");

            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Config(format!("{}: {}", parent.display(), e)))?;
            }

            let pool =
                sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.sqlite.path))
                    .await?;
            sql::sqlite::migrate(&pool).await?;

            Ok(Storage {
                bindings: Arc::new(SqliteBindingStore::new(pool.clone())),
                deployments: Arc::new(SqliteDeploymentStore::new(pool)),
            })
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            info!("Storage: postgres");

            let pool = sqlx::PgPool::connect(&config.postgres.uri).await?;
            sql::postgres::migrate(&pool).await?;

            Ok(Storage {
                bindings: Arc::new(PostgresBindingStore::new(pool.clone())),
                deployments: Arc::new(PostgresDeploymentStore::new(pool)),
            })
        }
        #[allow(unreachable_patterns)]
        ref other => Err(StorageError::Config(format!(
            "storage type {:?} requested but its feature is not enabled",
            other
        ))),
    }
}
