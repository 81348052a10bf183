//! The network side of the host-does-IO split.
//!
//! A `Transport` executes one `HttpRequest` and hands back the raw
//! `HttpResponse`, whatever its status. Only failures that produced no
//! response at all (connection refused, timeout, malformed URL) are
//! `TransportError`s. Timeout and cancellation policy live here, not in the
//! client.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: config.timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, request.path.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_an_invalid_request() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "not a url".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = ReqwestTransport::new().execute(request).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)), "{err}");
    }

    #[test]
    fn timeout_comes_from_config() {
        let config = ClientConfig::default().with_timeout(Duration::from_secs(3));
        let transport = ReqwestTransport::from_config(&config);
        assert_eq!(transport.timeout, Some(Duration::from_secs(3)));
    }
}
