//! Metrics collection and exposition for Prometheus.
//!
//! Counts refreshes, post-401 retries and guard decisions.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
