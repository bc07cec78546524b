//! Per-gateway call counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts provider calls and failures for one gateway instance.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    /// Number of requests sent to the translation provider
    api_calls: AtomicUsize,

    /// Number of requests that ended in an unavailable result
    api_failures: AtomicUsize,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request to the translation provider.
    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that produced no usable answer.
    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    /// Snapshot the counters.
    pub fn report(&self) -> MetricsReport {
        let calls = self.api_calls();
        let failures = self.api_failures();
        let success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            calls,
            failures,
            success_rate,
        }
    }
}

/// Snapshot of gateway counters, reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Number of provider requests
    pub calls: usize,

    /// Number of failed provider requests
    pub failures: usize,

    /// Success rate as a percentage (0-100)
    pub success_rate: f64,
}
