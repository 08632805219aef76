//! Mock BindingStore implementation for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::{BindingStore, PlaceholderMapping, Result, StorageError};

/// Key type for bindings: (placeholder_name, set_id).
type BindingKey = (String, String);

/// Mock binding store that keeps bindings in memory.
///
/// Enforces the same `(placeholder_name, set_id)` uniqueness as the SQL stores.
#[derive(Default)]
pub struct MockBindingStore {
    bindings: RwLock<Vec<PlaceholderMapping>>,
    fail_on_record: RwLock<bool>,
}

impl MockBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `record_binding` fail with a configuration error.
    pub async fn set_fail_on_record(&self, fail: bool) {
        *self.fail_on_record.write().await = fail;
    }

    /// Every stored binding, in insertion order.
    pub async fn all(&self) -> Vec<PlaceholderMapping> {
        self.bindings.read().await.clone()
    }

    pub async fn stored_count(&self) -> usize {
        self.bindings.read().await.len()
    }
}

fn key_of(mapping: &PlaceholderMapping) -> BindingKey {
    (mapping.placeholder_name.clone(), mapping.set_id.clone())
}

#[async_trait]
impl BindingStore for MockBindingStore {
    async fn record_binding(&self, mapping: &PlaceholderMapping) -> Result<()> {
        if *self.fail_on_record.read().await {
            return Err(StorageError::Config("mock record failure".to_string()));
        }

        let mut bindings = self.bindings.write().await;
        let key = key_of(mapping);
        if bindings.iter().any(|existing| key_of(existing) == key) {
            return Err(StorageError::BindingAlreadyExists {
                name: mapping.placeholder_name.clone(),
                set_id: mapping.set_id.clone(),
            });
        }
        bindings.push(mapping.clone());
        Ok(())
    }

    async fn bindings_for_generation(&self, set_id: &str) -> Result<HashMap<String, String>> {
        let bindings = self.bindings.read().await;
        Ok(bindings
            .iter()
            .filter(|m| m.set_id == set_id)
            .map(|m| (m.placeholder_name.clone(), m.placeholder_id.clone()))
            .collect())
    }

    async fn find_binding(&self, name: &str, set_id: &str) -> Result<Option<PlaceholderMapping>> {
        let bindings = self.bindings.read().await;
        Ok(bindings
            .iter()
            .find(|m| m.placeholder_name == name && m.set_id == set_id)
            .cloned())
    }

    async fn bindings_for_deployment(&self, deployment_id: i64) -> Result<Vec<PlaceholderMapping>> {
        let bindings = self.bindings.read().await;
        Ok(bindings
            .iter()
            .filter(|m| m.deployment_id == deployment_id)
            .cloned()
            .collect())
    }
}
