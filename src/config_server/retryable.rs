//! Connection and authorization retries around a config server transport.
//!
//! Two independent layers, nested:
//! - outer: retries connectivity-class transport errors (default 3 attempts)
//! - inner: retries 401 responses (default 2 attempts)
//!
//! A failure only ever consumes the budget of the layer whose predicate
//! matches it. A connectivity error during an authorization retry falls
//! through the inner layer and restarts it under the outer one.

use std::future::Future;

use async_trait::async_trait;
use tracing::error;

use crate::interfaces::{
    ConfigServerClient, ConfigServerError, ConfigServerTransport, RawResponse, StatusClass,
    TransportError,
};
use crate::utils::retry::{retry_when, RetryConfig};

/// Outcome of a single physical attempt, as the retry layers see it.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Transport(TransportError),

    #[error("Config server responded 401 Unauthorized")]
    Unauthorized,
}

impl AttemptError {
    fn is_connectivity(&self) -> bool {
        matches!(self, AttemptError::Transport(e) if e.is_connectivity())
    }

    fn is_unauthorized(&self) -> bool {
        matches!(self, AttemptError::Unauthorized)
    }
}

/// Turn a 401 into an error so the authorization layer can see it.
fn classify(result: Result<RawResponse, TransportError>) -> Result<RawResponse, AttemptError> {
    match result {
        Ok(response) if response.status_class() == StatusClass::Unauthorized => {
            Err(AttemptError::Unauthorized)
        }
        Ok(response) => Ok(response),
        Err(e) => Err(AttemptError::Transport(e)),
    }
}

/// Config server client that retries connectivity and authorization failures.
///
/// Every non-401 response, including 4xx and 5xx, is returned to the caller
/// as-is.
pub struct RetryableConfigServerClient<T> {
    transport: T,
    retry: RetryConfig,
}

impl<T: ConfigServerTransport> RetryableConfigServerClient<T> {
    /// Wrap `transport` with the default budgets.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, RetryConfig::default())
    }

    pub fn with_config(transport: T, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    async fn call<F, Fut>(&self, operation: &'static str, op: F) -> Result<RawResponse, ConfigServerError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<RawResponse, TransportError>>,
    {
        let op = &op;
        let authorization = &self.retry.authorization;

        let result = retry_when(
            "connection",
            &self.retry.connection,
            move || async move {
                retry_when(
                    "authorization",
                    authorization,
                    move || async move { classify(op().await) },
                    AttemptError::is_unauthorized,
                )
                .await
            },
            AttemptError::is_connectivity,
        )
        .await;

        result.map_err(|err| self.exhausted(operation, err))
    }

    fn exhausted(&self, operation: &'static str, err: AttemptError) -> ConfigServerError {
        match err {
            AttemptError::Unauthorized => {
                let attempts = self.retry.authorization.max_attempts();
                error!(operation, attempts, "Config server authorization retries exhausted");
                ConfigServerError::AuthorizationExhausted { attempts }
            }
            AttemptError::Transport(source) if source.is_connectivity() => {
                let attempts = self.retry.connection.max_attempts();
                error!(operation, attempts, error = %source, "Config server connection retries exhausted");
                ConfigServerError::ConnectivityExhausted { attempts, source }
            }
            AttemptError::Transport(source) => ConfigServerError::Transport(source),
        }
    }
}

#[async_trait]
impl<T: ConfigServerTransport> ConfigServerClient for RetryableConfigServerClient<T> {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, ConfigServerError> {
        self.call("fetch_by_id", || self.transport.fetch_by_id(id))
            .await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, ConfigServerError> {
        self.call("fetch_current_by_name", || {
            self.transport.fetch_current_by_name(name)
        })
        .await
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, ConfigServerError> {
        self.call("write", || self.transport.write(payload)).await
    }
}
