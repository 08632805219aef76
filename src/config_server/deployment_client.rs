//! Config server client that records name bindings for a deployment.

use async_trait::async_trait;
use tracing::info;

use crate::interfaces::{ConfigServerClient, ConfigServerError, RawResponse, VariableRef};
use crate::placeholder::PlaceholderManager;
use crate::storage::StorageError;

/// Wraps a resilient client and records every successful name lookup as a
/// binding in the deployment's current generation.
///
/// Lookups by id and writes pass straight through.
pub struct DeploymentConfigServerClient<C> {
    client: C,
    placeholders: PlaceholderManager,
}

impl<C: ConfigServerClient> DeploymentConfigServerClient<C> {
    pub fn new(client: C, placeholders: PlaceholderManager) -> Self {
        Self {
            client,
            placeholders,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn placeholders(&self) -> &PlaceholderManager {
        &self.placeholders
    }

    async fn record(&self, var: &VariableRef) -> Result<(), ConfigServerError> {
        match self.placeholders.add_mapping(&var.name, &var.id).await {
            Ok(_) => Ok(()),
            Err(StorageError::BindingAlreadyExists { name, set_id }) => {
                self.resolve_conflict(var, name, set_id).await
            }
            Err(StorageError::DeploymentNotFound(name)) => {
                Err(ConfigServerError::DeploymentNotFound(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A concurrent resolver for this deployment got there first. Agreeing
    /// on the id is fine; a different id or another deployment's row is a
    /// conflicting binding.
    async fn resolve_conflict(
        &self,
        var: &VariableRef,
        name: String,
        set_id: String,
    ) -> Result<(), ConfigServerError> {
        let deployment_id = self.placeholders.deployment().await?.id;
        let existing = self.placeholders.find_mapping(&name, &set_id).await?;
        match existing {
            Some(mapping)
                if mapping.deployment_id == deployment_id && mapping.placeholder_id == var.id =>
            {
                info!(
                    deployment = %self.placeholders.deployment_name(),
                    name = %name,
                    id = %var.id,
                    set_id = %set_id,
                    "Placeholder already bound to the same id"
                );
                Ok(())
            }
            _ => Err(StorageError::BindingAlreadyExists { name, set_id }.into()),
        }
    }
}

#[async_trait]
impl<C: ConfigServerClient> ConfigServerClient for DeploymentConfigServerClient<C> {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, ConfigServerError> {
        self.client.fetch_by_id(id).await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, ConfigServerError> {
        let response = self.client.fetch_current_by_name(name).await?;
        if response.is_success() {
            let var = response.first_match()?;
            self.record(&var).await?;
        }
        Ok(response)
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, ConfigServerError> {
        self.client.write(payload).await
    }
}
