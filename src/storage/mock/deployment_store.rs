//! Mock DeploymentStore implementation for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::{new_set_id, Deployment, DeploymentStore, Result, StorageError, INITIAL_SET_ID};

/// Mock deployment store that keeps deployments in memory, keyed by name.
///
/// Deleting a deployment does not touch any binding store.
#[derive(Default)]
pub struct MockDeploymentStore {
    deployments: RwLock<HashMap<String, Deployment>>,
    next_id: AtomicI64,
}

impl MockDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deployment already at the given generation.
    pub async fn insert_with_set_id(&self, name: &str, set_id: &str) -> Deployment {
        let deployment = Deployment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            placeholder_set_id: set_id.to_string(),
            successful_placeholder_set_id: None,
        };
        self.deployments
            .write()
            .await
            .insert(name.to_string(), deployment.clone());
        deployment
    }

    /// Overwrite the current generation without generating a new id.
    pub async fn set_placeholder_set_id(&self, name: &str, set_id: &str) -> Result<()> {
        let mut deployments = self.deployments.write().await;
        let deployment = deployments
            .get_mut(name)
            .ok_or_else(|| StorageError::DeploymentNotFound(name.to_string()))?;
        deployment.placeholder_set_id = set_id.to_string();
        Ok(())
    }
}

#[async_trait]
impl DeploymentStore for MockDeploymentStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Deployment>> {
        Ok(self.deployments.read().await.get(name).cloned())
    }

    async fn create(&self, name: &str) -> Result<Deployment> {
        if self.deployments.read().await.contains_key(name) {
            return Err(StorageError::DeploymentAlreadyExists(name.to_string()));
        }
        Ok(self.insert_with_set_id(name, INITIAL_SET_ID).await)
    }

    async fn start_generation(&self, name: &str) -> Result<String> {
        let set_id = new_set_id();
        self.set_placeholder_set_id(name, &set_id).await?;
        Ok(set_id)
    }

    async fn mark_generation_successful(&self, name: &str) -> Result<()> {
        let mut deployments = self.deployments.write().await;
        let deployment = deployments
            .get_mut(name)
            .ok_or_else(|| StorageError::DeploymentNotFound(name.to_string()))?;
        deployment.successful_placeholder_set_id = Some(deployment.placeholder_set_id.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.deployments.write().await.remove(name);
        Ok(())
    }
}
