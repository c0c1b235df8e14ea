//! Remote interpretation collaborator: trait seam plus the HTTP and offline implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{FollowUpRequest, FollowUpResponse, InterpretRequest, InterpretResponse};
use thiserror::Error;
use tracing::{debug, warn};

pub const INTERPRET_PATH: &str = "/api/interpret";
pub const FOLLOW_UP_PATH: &str = "/api/followup";
pub const HEALTH_PATH: &str = "/health";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build http client: {0}")]
    Setup(#[source] reqwest::Error),
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("failed to reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
    #[error("reading backend is unavailable")]
    Unavailable,
}

#[async_trait]
pub trait ReadingBackend: Send + Sync {
    async fn interpret(&self, request: &InterpretRequest)
        -> Result<InterpretResponse, BackendError>;
    async fn follow_up(&self, request: &FollowUpRequest)
        -> Result<FollowUpResponse, BackendError>;
    /// Advisory liveness probe; never gates a reading.
    async fn health(&self) -> bool;
}

/// Backend used in offline mode. Every call fails, which routes all readings
/// through the local templates.
pub struct MissingReadingBackend;

#[async_trait]
impl ReadingBackend for MissingReadingBackend {
    async fn interpret(
        &self,
        _request: &InterpretRequest,
    ) -> Result<InterpretResponse, BackendError> {
        Err(BackendError::Unavailable)
    }

    async fn follow_up(&self, _request: &FollowUpRequest) -> Result<FollowUpResponse, BackendError> {
        Err(BackendError::Unavailable)
    }

    async fn health(&self) -> bool {
        false
    }
}

pub struct HttpReadingBackend {
    http: Client,
    base_url: String,
}

impl HttpReadingBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Setup)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let endpoint = format!("{}{path}", self.base_url);
        debug!(%endpoint, "calling reading backend");

        let response = self
            .http
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| classify_transport(&endpoint, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { endpoint, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_transport(&endpoint, err))?;
        serde_json::from_slice(&bytes).map_err(|err| BackendError::Malformed {
            endpoint,
            reason: err.to_string(),
        })
    }
}

fn classify_transport(endpoint: &str, err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        BackendError::Transport {
            endpoint: endpoint.to_string(),
            source: err,
        }
    }
}

#[async_trait]
impl ReadingBackend for HttpReadingBackend {
    async fn interpret(
        &self,
        request: &InterpretRequest,
    ) -> Result<InterpretResponse, BackendError> {
        self.post_json(INTERPRET_PATH, request).await
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, BackendError> {
        self.post_json(FOLLOW_UP_PATH, request).await
    }

    async fn health(&self) -> bool {
        let endpoint = format!("{}{HEALTH_PATH}", self.base_url);
        match self.http.get(&endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!(%endpoint, error = %err, "health probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
