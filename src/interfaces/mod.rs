//! Abstract interfaces for placebind components.
//!
//! These traits define the contracts for:
//! - Config server transport (one physical call per operation)
//! - Config server clients (retrying, binding-recording)
//! - Bearer credential providers
//! - Binding storage (placeholder name -> config server id per generation)
//! - Deployment generations

pub mod binding_store;
pub mod config_server;
pub mod credentials;
pub mod deployment_store;

pub use binding_store::{BindingStore, PlaceholderMapping, Result, StorageError};
pub use config_server::{
    ConfigServerClient, ConfigServerError, ConfigServerTransport, RawResponse, StatusClass,
    TransportError, VariableRef,
};
pub use credentials::{CredentialError, CredentialProvider};
pub use deployment_store::{new_set_id, Deployment, DeploymentStore, INITIAL_SET_ID};
