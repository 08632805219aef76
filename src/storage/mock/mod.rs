//! Mock storage implementations for testing.

mod binding_store;
mod deployment_store;

pub use binding_store::MockBindingStore;
pub use deployment_store::MockDeploymentStore;
