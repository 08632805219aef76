//! Config server client interfaces.
//!
//! Two layers share the same three operations:
//! - [`ConfigServerTransport`]: exactly one HTTP call per operation, failures uninterpreted
//! - [`ConfigServerClient`]: what deployment code talks to (retrying, recording)

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::binding_store::StorageError;
use super::credentials::CredentialError;

/// Closed classification of config server response statuses.
///
/// Retry and recording layers branch on this instead of raw status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// 401. Triggers the authorization retry path.
    Unauthorized,
    /// Any other non-2xx, non-5xx status (4xx, plus the unexpected 1xx/3xx).
    OtherClientError,
    /// 5xx.
    ServerError,
}

impl StatusClass {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            StatusClass::Success
        } else if status == StatusCode::UNAUTHORIZED {
            StatusClass::Unauthorized
        } else if status.is_server_error() {
            StatusClass::ServerError
        } else {
            StatusClass::OtherClientError
        }
    }
}

/// A config server response, body already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.status_class() == StatusClass::Success
    }

    /// Parse the first entry of a `GET /v1/data?name=..&current=true` body.
    ///
    /// Fails rather than yielding an empty id when `data[0]`, its `name` or
    /// its `id` is missing.
    pub fn first_match(&self) -> Result<VariableRef, ConfigServerError> {
        #[derive(Deserialize)]
        struct DataList {
            data: Option<Vec<serde_json::Value>>,
        }

        let list: DataList = serde_json::from_str(&self.body)
            .map_err(|e| ConfigServerError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        let first = list
            .data
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| {
                ConfigServerError::MalformedResponse("response has no data[0] entry".to_string())
            })?;

        let name = scalar_field(&first, "name")?;
        let id = scalar_field(&first, "id")?;
        Ok(VariableRef { name, id })
    }
}

/// The `(name, id)` pair identifying one variable version on the config server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub name: String,
    pub id: String,
}

/// Ids come back as strings from current servers; older ones sent integers.
fn scalar_field(entry: &serde_json::Value, field: &str) -> Result<String, ConfigServerError> {
    match entry.get(field) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ConfigServerError::MalformedResponse(format!(
            "data[0].{} missing or empty",
            field
        ))),
    }
}

/// Raw transport failures, as the transport saw them.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Connection dropped: {0}")]
    Disconnected(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("Invalid config server URL: {0}")]
    Url(String),

    #[error("Credential provider failed: {0}")]
    Credentials(#[from] CredentialError),
}

impl TransportError {
    /// Whether this is transient connectivity noise worth another attempt.
    ///
    /// Covers DNS failures, refused/reset connections, connect and read
    /// timeouts, TLS handshake failures and keep-alive disconnects.
    pub fn is_connectivity(&self) -> bool {
        match self {
            TransportError::Connect(_)
            | TransportError::Timeout(_)
            | TransportError::Disconnected(_) => true,
            TransportError::Io(err) => is_connectivity_kind(err.kind()),
            TransportError::Request(_)
            | TransportError::TlsConfig(_)
            | TransportError::Url(_)
            | TransportError::Credentials(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest reports DNS, refused and TLS handshake failures as connect errors
        if err.is_timeout() {
            TransportError::Timeout(err)
        } else if err.is_connect() {
            TransportError::Connect(err)
        } else if dropped_connection(&err) {
            TransportError::Disconnected(err)
        } else {
            TransportError::Request(err)
        }
    }
}

fn is_connectivity_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::UnexpectedEof
    )
}

/// Walks the source chain for a reset socket or a connection hyper saw close
/// before the response was complete.
fn dropped_connection(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if is_connectivity_kind(io_err.kind()) {
                return true;
            }
        }
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() || hyper_err.is_canceled() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Errors surfaced by resilient config server clients.
#[derive(Debug, thiserror::Error)]
pub enum ConfigServerError {
    #[error("Config server unreachable after {attempts} attempts: {source}")]
    ConnectivityExhausted {
        attempts: usize,
        #[source]
        source: TransportError,
    },

    #[error("Config server rejected credentials after {attempts} attempts")]
    AuthorizationExhausted { attempts: usize },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed config server response: {0}")]
    MalformedResponse(String),

    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConfigServerError {
    pub fn is_connectivity_exhausted(&self) -> bool {
        matches!(self, ConfigServerError::ConnectivityExhausted { .. })
    }

    pub fn is_authorization_exhausted(&self) -> bool {
        matches!(self, ConfigServerError::AuthorizationExhausted { .. })
    }

    /// Whether a binding write lost to an existing, different binding.
    pub fn is_binding_already_exists(&self) -> bool {
        matches!(
            self,
            ConfigServerError::Storage(StorageError::BindingAlreadyExists { .. })
        )
    }
}

/// One physical call per operation against the config server.
///
/// Implementations:
/// - `HttpConfigServerClient`: HTTPS via reqwest
/// - `MockTransport`: scripted outcomes for tests
#[async_trait]
pub trait ConfigServerTransport: Send + Sync {
    /// `GET /v1/data/{id}`.
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, TransportError>;

    /// `GET /v1/data?name={name}&current=true`.
    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, TransportError>;

    /// `POST /v1/data` with a JSON body.
    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, TransportError>;
}

/// Config server operations as deployment code sees them.
///
/// Implementations:
/// - `RetryableConfigServerClient`: connection and authorization retries
/// - `DeploymentConfigServerClient`: records name bindings per generation
#[async_trait]
pub trait ConfigServerClient: Send + Sync {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, ConfigServerError>;

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, ConfigServerError>;

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, ConfigServerError>;
}

#[async_trait]
impl<T: ConfigServerTransport + ?Sized> ConfigServerTransport for Arc<T> {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, TransportError> {
        (**self).fetch_by_id(id).await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, TransportError> {
        (**self).fetch_current_by_name(name).await
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, TransportError> {
        (**self).write(payload).await
    }
}

#[async_trait]
impl<T: ConfigServerClient + ?Sized> ConfigServerClient for Arc<T> {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, ConfigServerError> {
        (**self).fetch_by_id(id).await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, ConfigServerError> {
        (**self).fetch_current_by_name(name).await
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, ConfigServerError> {
        (**self).write(payload).await
    }
}
