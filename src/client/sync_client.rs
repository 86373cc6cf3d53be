//! Sync HTTP Client
//!
//! Implements the push/pull contract against the sync server. The engine
//! only sees the [`SyncTransport`] trait, so tests substitute a scripted
//! transport and never touch the network.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

use crate::shared::config::SyncConfig;
use crate::shared::error::{Result, SyncError};
use crate::shared::protocol::{ErrorBody, PullResponse, PushRequest, PULL_PATH, PUSH_PATH};

/// Remote side of the sync engine
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Deliver one mutation.
    ///
    /// Returns [`SyncError::Conflict`] only when the server explicitly flags
    /// the mutation as conflicting.
    async fn push(&self, request: &PushRequest) -> Result<()>;

    /// Fetch changes recorded after `cursor`
    async fn pull(&self, cursor: Option<u64>) -> Result<PullResponse>;
}

/// [`SyncTransport`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    push_url: String,
    pull_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a transport from configuration.
    ///
    /// Every request is bounded by `config.request_timeout`.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            push_url: config.api_url(PUSH_PATH),
            pull_url: config.api_url(PULL_PATH),
            token: config.api_token.clone(),
        })
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(url);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn push(&self, request: &PushRequest) -> Result<()> {
        let response = self.post(&self.push_url).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
            .unwrap_or_else(|| status.to_string());

        if body.conflict {
            Err(SyncError::conflict(message))
        } else {
            Err(SyncError::api(status.as_u16(), message))
        }
    }

    async fn pull(&self, cursor: Option<u64>) -> Result<PullResponse> {
        let mut request = self.post(&self.pull_url);
        if let Some(since) = cursor {
            request = request.query(&[("since", since)]);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::Unauthenticated);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(SyncError::api(status.as_u16(), message));
        }

        if !content_type
            .to_ascii_lowercase()
            .starts_with("application/json")
        {
            return Err(SyncError::NotJson { content_type });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!("Unparseable pull body: {}", e);
            SyncError::NotJson { content_type }
        })
    }
}
