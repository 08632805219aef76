//! Placeholder bindings for one deployment.
//!
//! Reads the deployment's generation fresh on every call; nothing about
//! the deployment is cached here.

mod diff;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

pub use diff::{BindingChange, GenerationDiff};

use crate::storage::{
    BindingStore, Deployment, DeploymentStore, PlaceholderMapping, Result, StorageError,
};

/// Binding queries and writes scoped to a named deployment.
#[derive(Clone)]
pub struct PlaceholderManager {
    deployment_name: String,
    deployments: Arc<dyn DeploymentStore>,
    bindings: Arc<dyn BindingStore>,
}

impl PlaceholderManager {
    pub fn new(
        deployment_name: impl Into<String>,
        deployments: Arc<dyn DeploymentStore>,
        bindings: Arc<dyn BindingStore>,
    ) -> Self {
        Self {
            deployment_name: deployment_name.into(),
            deployments,
            bindings,
        }
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    /// The deployment record as currently stored.
    pub async fn deployment(&self) -> Result<Deployment> {
        self.deployments
            .find_by_name(&self.deployment_name)
            .await?
            .ok_or_else(|| StorageError::DeploymentNotFound(self.deployment_name.clone()))
    }

    /// The deployment's current `placeholder_set_id`.
    pub async fn current_generation(&self) -> Result<String> {
        Ok(self.deployment().await?.placeholder_set_id)
    }

    /// Bind `name` to `id` in the deployment's current generation.
    ///
    /// Fails with `BindingAlreadyExists` if the name is already bound in
    /// that generation, whatever the existing id is.
    pub async fn add_mapping(&self, name: &str, id: &str) -> Result<PlaceholderMapping> {
        let deployment = self.deployment().await?;
        let mapping =
            PlaceholderMapping::new(name, id, deployment.id, deployment.placeholder_set_id);

        self.bindings.record_binding(&mapping).await?;

        debug!(
            deployment = %self.deployment_name,
            name = %mapping.placeholder_name,
            id = %mapping.placeholder_id,
            set_id = %mapping.set_id,
            "Recorded placeholder binding"
        );
        Ok(mapping)
    }

    pub async fn find_mapping(&self, name: &str, set_id: &str) -> Result<Option<PlaceholderMapping>> {
        self.bindings.find_binding(name, set_id).await
    }

    /// All name -> id bindings recorded under `set_id`.
    pub async fn bindings_for_generation(&self, set_id: &str) -> Result<HashMap<String, String>> {
        self.bindings.bindings_for_generation(set_id).await
    }

    /// Every binding this deployment has recorded, across generations.
    pub async fn history(&self) -> Result<Vec<PlaceholderMapping>> {
        let deployment = self.deployment().await?;
        self.bindings.bindings_for_deployment(deployment.id).await
    }

    pub async fn diff_generations(&self, from_set: &str, to_set: &str) -> Result<GenerationDiff> {
        let from = self.bindings.bindings_for_generation(from_set).await?;
        let to = self.bindings.bindings_for_generation(to_set).await?;
        Ok(GenerationDiff::between(&from, &to))
    }

    /// Changes between the last successful generation and the current one.
    ///
    /// With no successful generation yet, everything current counts as added.
    pub async fn changes_since_last_success(&self) -> Result<GenerationDiff> {
        let deployment = self.deployment().await?;
        let from = match &deployment.successful_placeholder_set_id {
            Some(set_id) => self.bindings.bindings_for_generation(set_id).await?,
            None => HashMap::new(),
        };
        let to = self
            .bindings
            .bindings_for_generation(&deployment.placeholder_set_id)
            .await?;
        Ok(GenerationDiff::between(&from, &to))
    }
}
