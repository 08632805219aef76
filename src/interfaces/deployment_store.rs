//! Deployment generation interface.

use async_trait::async_trait;
use serde::Serialize;

use super::binding_store::Result;

/// Set id carried by deployments created before generations existed.
pub const INITIAL_SET_ID: &str = "initial";

/// The slice of a deployment record this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub id: i64,
    pub name: String,
    /// Current (in-progress or most recent) generation. Never empty.
    pub placeholder_set_id: String,
    /// Generation of the last deploy that completed successfully.
    pub successful_placeholder_set_id: Option<String>,
}

/// Interface to the deployments table.
///
/// The client stack only reads through it (`find_by_name`); the rest is
/// for the deploy driver that owns the deployment lifecycle.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Look up a deployment by name. Always reads current state.
    async fn find_by_name(&self, name: &str) -> Result<Option<Deployment>>;

    /// Create a deployment at the `INITIAL_SET_ID` generation.
    async fn create(&self, name: &str) -> Result<Deployment>;

    /// Move the deployment to a freshly generated set id and return it.
    async fn start_generation(&self, name: &str) -> Result<String>;

    /// Record the current generation as the last successful one.
    async fn mark_generation_successful(&self, name: &str) -> Result<()>;

    /// Delete the deployment; its bindings go with it.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// A fresh generation identifier.
pub fn new_set_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
