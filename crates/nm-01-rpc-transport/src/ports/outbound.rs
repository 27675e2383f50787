//! Outbound port: raw HTTP exchange with one node.

use crate::domain::{NodeEndpoint, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Posts one JSON body to one node.
///
/// Implementations map transport-level problems onto `TransportError`:
/// HTTP 429 is `RateLimited`, a connect failure is `Unreachable`, an
/// expired deadline is `Timeout`, any other non-2xx is `HttpStatus`. The
/// reply body is returned as-is; checking its `error` field is the
/// caller's job.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn post(
        &self,
        node: &NodeEndpoint,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}
