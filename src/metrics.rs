//! Endpoint health metrics
//!
//! Tracks latency percentiles and success rates for each provider endpoint
//! (market listing, price chart) over a rolling window.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Metrics snapshot for a single endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMetrics {
    /// Endpoint label, e.g. "coins/markets"
    pub endpoint: String,
    /// 50th percentile latency of successful requests in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful requests in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of requests tracked
    pub total_requests: u64,
    /// Number of failed requests
    pub failed_requests: u64,
}

#[derive(Debug, Default)]
struct Window {
    /// Rolling window of (latency_ms, success)
    samples: VecDeque<(f64, bool)>,
    total_requests: u64,
    failed_requests: u64,
}

/// Collects request outcomes for one endpoint
#[derive(Debug)]
pub struct MetricsCollector {
    endpoint: String,
    window: RwLock<Window>,
}

impl MetricsCollector {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            window: RwLock::new(Window {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..Window::default()
            }),
        }
    }

    /// Records a request with its duration and success status
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let mut window = self.window.write().await;
        window.total_requests += 1;
        if !success {
            window.failed_requests += 1;
        }
        if window.samples.len() >= MAX_SAMPLES {
            window.samples.pop_front();
        }
        window
            .samples
            .push_back((duration.as_secs_f64() * 1000.0, success));
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> EndpointMetrics {
        let window = self.window.read().await;

        let mut latencies: Vec<f64> = window
            .samples
            .iter()
            .filter(|(_, success)| *success)
            .map(|(ms, _)| *ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if window.total_requests > 0 {
            (window.total_requests - window.failed_requests) as f64 / window.total_requests as f64
        } else {
            1.0
        };

        EndpointMetrics {
            endpoint: self.endpoint.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: window.total_requests,
            failed_requests: window.failed_requests,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
