//! Metrics recording implementation using Prometheus.

use prometheus::{
    CounterVec, Encoder, HistogramVec, Opts, Registry, TextEncoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};
use std::sync::Arc;

/// Trait for recording session pipeline metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records a token refresh call and its outcome (`success` / `failure`).
    fn record_refresh_attempt(&self, result: &str);

    /// Records what happened after a 401 (`retried`, `exhausted`, `refresh_failed`).
    fn record_request_retry(&self, result: &str);

    /// Records a route guard resolution.
    fn record_guard_decision(&self, state: &str);

    /// Records the wall time of an authenticated request, retries included.
    fn record_request_duration(&self, method: &str, outcome: &str, duration_secs: f64);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    refresh_attempts_total: CounterVec,
    request_retries_total: CounterVec,
    guard_decisions_total: CounterVec,
    request_duration_seconds: HistogramVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let refresh_attempts_total = register_counter_vec_with_registry!(
            Opts::new(
                "panel_refresh_attempts_total",
                "Total number of access token refresh calls"
            ),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register panel_refresh_attempts_total");

        let request_retries_total = register_counter_vec_with_registry!(
            Opts::new(
                "panel_request_retries_total",
                "Outcomes of requests that received a 401"
            ),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register panel_request_retries_total");

        let guard_decisions_total = register_counter_vec_with_registry!(
            Opts::new(
                "panel_guard_decisions_total",
                "Route guard resolutions by final state"
            ),
            &["state"],
            registry.clone()
        )
        .expect("Failed to register panel_guard_decisions_total");

        let request_duration_seconds = register_histogram_vec_with_registry!(
            "panel_request_duration_seconds",
            "Authenticated request duration in seconds, including refresh and retry",
            &["method", "outcome"],
            vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
            ],
            registry.clone()
        )
        .expect("Failed to register panel_request_duration_seconds");

        Metrics {
            registry,
            refresh_attempts_total,
            request_retries_total,
            guard_decisions_total,
            request_duration_seconds,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl MetricsRecorder for Metrics {
    fn record_refresh_attempt(&self, result: &str) {
        self.refresh_attempts_total.with_label_values(&[result]).inc();
    }

    fn record_request_retry(&self, result: &str) {
        self.request_retries_total.with_label_values(&[result]).inc();
    }

    fn record_guard_decision(&self, state: &str) {
        self.guard_decisions_total.with_label_values(&[state]).inc();
    }

    fn record_request_duration(&self, method: &str, outcome: &str, duration_secs: f64) {
        self.request_duration_seconds
            .with_label_values(&[method, outcome])
            .observe(duration_secs);
    }
}
