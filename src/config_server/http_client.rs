//! HTTPS transport to the config server.
//!
//! One physical request per call. Nothing here retries or interprets
//! statuses; a 401 comes back as an ordinary response.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Certificate, Client, RequestBuilder, Url};
use tracing::debug;

use crate::config::ConfigServerConfig;
use crate::interfaces::{ConfigServerTransport, CredentialProvider, RawResponse, TransportError};

/// reqwest-backed config server transport.
///
/// Holds one connection pool; clone-free, share it behind an `Arc` if needed.
pub struct HttpConfigServerClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpConfigServerClient {
    /// Build a transport from explicit configuration.
    ///
    /// A configured, non-blank CA file replaces the built-in trust roots;
    /// otherwise the platform trust store is used.
    pub fn new(
        config: &ConfigServerConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, TransportError> {
        let base_url = config
            .base_url()
            .map_err(|e| TransportError::Url(e.to_string()))?;

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .redirect(redirect::Policy::none());

        if let Some(pem) = pinned_ca(config.ca_cert_path.as_deref())? {
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| TransportError::TlsConfig(format!("invalid CA certificate: {}", e)))?;
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::TlsConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Url(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn data_url(&self) -> Result<Url, TransportError> {
        self.endpoint(&["v1", "data"])
    }

    fn data_by_id_url(&self, id: &str) -> Result<Url, TransportError> {
        self.endpoint(&["v1", "data", id])
    }

    fn current_by_name_url(&self, name: &str) -> Result<Url, TransportError> {
        let mut url = self.data_url()?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("current", "true");
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<RawResponse, TransportError> {
        let auth_header = self.credentials.auth_header().await?;
        let response = request.header(AUTHORIZATION, auth_header).send().await?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        debug!(path = %url, status = %status, "Config server responded");
        Ok(RawResponse::new(status, body))
    }
}

/// PEM bytes to pin, if `path` names an existing file with non-blank content.
pub(crate) fn pinned_ca(path: Option<&Path>) -> Result<Option<Vec<u8>>, TransportError> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let pem = std::fs::read(path)
        .map_err(|e| TransportError::TlsConfig(format!("{}: {}", path.display(), e)))?;
    if pem.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(pem))
}

#[async_trait]
impl ConfigServerTransport for HttpConfigServerClient {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, TransportError> {
        let url = self.data_by_id_url(id)?;
        self.send(self.client.get(url)).await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, TransportError> {
        let url = self.current_by_name_url(name)?;
        self.send(self.client.get(url)).await
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, TransportError> {
        let url = self.data_url()?;
        let body = serde_json::to_vec(payload)
            .map_err(|e| TransportError::Url(format!("unserializable payload: {}", e)))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request).await
    }
}
