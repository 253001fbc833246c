//! `reqwest`-backed [`ActionTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use openspots_core::config::server::ServerConfig;
use openspots_core::error::ErrorKind;
use openspots_core::traits::ActionTransport;
use openspots_core::{AppError, AppResult};

/// Failures of a single action request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: StatusCode, message: String },
    #[error("response is not JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        let kind = match &err {
            TransportError::Request(_) | TransportError::UnexpectedStatus { .. } => {
                ErrorKind::Network
            }
            TransportError::InvalidBody(_) => ErrorKind::Protocol,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

/// Posts reservation actions to the venue server with the admin's session.
#[derive(Debug, Clone)]
pub struct HttpActionTransport {
    http: Client,
    server: ServerConfig,
}

impl HttpActionTransport {
    pub fn new(server: ServerConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(server.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self { http, server })
    }

    async fn post(&self, url: &str) -> Result<Value, TransportError> {
        let url = self.server.resolve(url);
        debug!(%url, "POST reservation action");

        let mut request = self
            .http
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&serde_json::json!({}));
        if !self.server.csrf_token.is_empty() {
            request = request.header("X-CSRFToken", &self.server.csrf_token);
        }
        if !self.server.session_cookie.is_empty() {
            request = request.header(reqwest::header::COOKIE, &self.server.session_cookie);
        }

        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status,
                message: server_error_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(TransportError::InvalidBody)
    }
}

#[async_trait]
impl ActionTransport for HttpActionTransport {
    async fn post_json(&self, url: &str) -> AppResult<Value> {
        Ok(self.post(url).await?)
    }
}

/// The `error` field of a JSON error body, or a generic message.
pub fn server_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "Server error".to_string())
}
