//! Mock config server transport for testing.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;

use crate::interfaces::{ConfigServerTransport, RawResponse, TransportError};

/// One scripted result for a single physical call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// The server answered with this status and body.
    Respond(RawResponse),
    /// The connection could not be established.
    Refused,
    /// The server closed a kept-alive connection mid-request.
    Reset,
    /// A non-connectivity I/O failure.
    Denied,
}

impl MockOutcome {
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        MockOutcome::Respond(RawResponse::new(status, body))
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(StatusCode::OK, body)
    }

    pub fn unauthorized() -> Self {
        Self::status(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_token"}"#)
    }

    fn into_result(self) -> Result<RawResponse, TransportError> {
        match self {
            MockOutcome::Respond(response) => Ok(response),
            MockOutcome::Refused => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock connection refused",
            )
            .into()),
            MockOutcome::Reset => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "mock connection reset",
            )
            .into()),
            MockOutcome::Denied => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock permission denied",
            )
            .into()),
        }
    }
}

/// A recorded call, in the order the transport saw them.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    FetchById(String),
    FetchCurrentByName(String),
    Write(serde_json::Value),
}

/// Transport returning scripted outcomes.
///
/// Each call pops the next outcome from one shared queue; once the queue is
/// empty, the fallback outcome is returned (200 with an empty `data` list).
pub struct MockTransport {
    script: RwLock<VecDeque<MockOutcome>>,
    fallback: RwLock<MockOutcome>,
    calls: RwLock<Vec<MockCall>>,
    attempts: AtomicUsize,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            script: RwLock::new(VecDeque::new()),
            fallback: RwLock::new(MockOutcome::ok(r#"{"data":[]}"#)),
            calls: RwLock::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose next calls return `outcomes` in order.
    pub fn scripted(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        Self {
            script: RwLock::new(outcomes.into_iter().collect()),
            ..Default::default()
        }
    }

    pub async fn push(&self, outcome: MockOutcome) {
        self.script.write().await.push_back(outcome);
    }

    /// Outcome returned once the script is exhausted.
    pub async fn set_fallback(&self, outcome: MockOutcome) {
        *self.fallback.write().await = outcome;
    }

    /// Physical calls made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    async fn next(&self, call: MockCall) -> Result<RawResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.calls.write().await.push(call);

        let scripted = self.script.write().await.pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None => self.fallback.read().await.clone(),
        };
        outcome.into_result()
    }
}

#[async_trait]
impl ConfigServerTransport for MockTransport {
    async fn fetch_by_id(&self, id: &str) -> Result<RawResponse, TransportError> {
        self.next(MockCall::FetchById(id.to_string())).await
    }

    async fn fetch_current_by_name(&self, name: &str) -> Result<RawResponse, TransportError> {
        self.next(MockCall::FetchCurrentByName(name.to_string()))
            .await
    }

    async fn write(&self, payload: &serde_json::Value) -> Result<RawResponse, TransportError> {
        self.next(MockCall::Write(payload.clone())).await
    }
}
