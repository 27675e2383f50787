//! Request counters, reported by `/health`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,
    /// Calls to block-publishing tools
    pub write_requests_total: AtomicU64,
    pub batch_requests_total: AtomicU64,

    // Latency tracking (sum and count; no histogram)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request
    pub fn record_request(&self, success: bool, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }

        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self) {
        self.batch_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requestsTotal": self.requests_total.load(Ordering::Relaxed),
            "requestsSuccess": self.requests_success.load(Ordering::Relaxed),
            "requestsError": self.requests_error.load(Ordering::Relaxed),
            "writeRequests": self.write_requests_total.load(Ordering::Relaxed),
            "batchRequests": self.batch_requests_total.load(Ordering::Relaxed),
            "averageLatencyMs": self.average_latency_ms(),
        })
    }
}

/// Measures one request
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
