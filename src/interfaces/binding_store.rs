//! Placeholder binding storage interface.

use std::collections::HashMap;

use async_trait::async_trait;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Placeholder '{name}' is already bound in set {set_id}")]
    BindingAlreadyExists { name: String, set_id: String },

    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error("Deployment already exists: {0}")]
    DeploymentAlreadyExists(String),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// One recorded binding of a placeholder name to a config server id.
///
/// Rows are never updated; they go away only when the owning deployment does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMapping {
    pub placeholder_name: String,
    pub placeholder_id: String,
    pub deployment_id: i64,
    pub set_id: String,
}

impl PlaceholderMapping {
    pub fn new(
        placeholder_name: impl Into<String>,
        placeholder_id: impl Into<String>,
        deployment_id: i64,
        set_id: impl Into<String>,
    ) -> Self {
        Self {
            placeholder_name: placeholder_name.into(),
            placeholder_id: placeholder_id.into(),
            deployment_id,
            set_id: set_id.into(),
        }
    }
}

/// Interface for placeholder binding persistence.
///
/// `(placeholder_name, set_id)` is unique across all deployments, and the
/// store itself enforces it: of two concurrent inserts for the same pair,
/// exactly one succeeds and the other gets `BindingAlreadyExists`.
///
/// Implementations:
/// - `SqlBindingStore<Sqlite>` / `SqlBindingStore<Postgres>`
/// - `MockBindingStore`: in-memory, same uniqueness rule
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Insert one binding.
    async fn record_binding(&self, mapping: &PlaceholderMapping) -> Result<()>;

    /// All `name -> id` bindings recorded under a generation.
    async fn bindings_for_generation(&self, set_id: &str) -> Result<HashMap<String, String>>;

    /// The binding for a name within a generation, if any.
    async fn find_binding(&self, name: &str, set_id: &str) -> Result<Option<PlaceholderMapping>>;

    /// Every binding owned by a deployment, across generations.
    async fn bindings_for_deployment(&self, deployment_id: i64) -> Result<Vec<PlaceholderMapping>>;
}
