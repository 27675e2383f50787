//! `reqwest`-based node connector.

use crate::domain::{NodeEndpoint, TransportError};
use crate::ports::NodeConnector;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};

/// HTTP connector backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestConnector {
    client: Client,
}

impl ReqwestConnector {
    /// Create a connector. Per-request timeouts are set on each call.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("nano-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Unreachable {
                node: "-".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn classify(node: &NodeEndpoint, error: reqwest::Error, started: Instant) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                node: node.url.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        } else if error.is_connect() || error.is_request() {
            TransportError::Unreachable {
                node: node.url.clone(),
                reason: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            status_error(node, status)
        } else {
            TransportError::InvalidResponse(error.to_string())
        }
    }
}

fn status_error(node: &NodeEndpoint, status: StatusCode) -> TransportError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        TransportError::RateLimited {
            node: node.url.clone(),
        }
    } else {
        TransportError::HttpStatus {
            node: node.url.clone(),
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl NodeConnector for ReqwestConnector {
    async fn post(
        &self,
        node: &NodeEndpoint,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let mut request = self.client.post(&node.url).timeout(timeout).json(body);
        if let Some(key) = &node.api_key {
            request = request.header(AUTHORIZATION, key);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| Self::classify(node, e, started))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(node, status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Self::classify(node, e, started))
    }
}
