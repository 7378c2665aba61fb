// src/core/metrics.rs

//! Defines and registers Prometheus metrics for agent monitoring.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, Histogram, TextEncoder, register_counter_vec, register_gauge,
    register_histogram,
};

lazy_static! {
    /// The total number of directory requests, labeled by operation.
    pub static ref DIRECTORY_REQUESTS_TOTAL: CounterVec =
        register_counter_vec!("convoy_directory_requests_total", "Total number of directory requests, labeled by operation.", &["operation"]).unwrap();
    /// The total number of failed directory requests, labeled by error kind.
    pub static ref DIRECTORY_ERRORS_TOTAL: CounterVec =
        register_counter_vec!("convoy_directory_errors_total", "Total number of failed directory requests, labeled by error kind.", &["kind"]).unwrap();
    /// Fallback server registrations, labeled accepted, duplicate or rejected.
    pub static ref FALLBACK_REGISTRATIONS_TOTAL: CounterVec =
        register_counter_vec!("convoy_fallback_registrations_total", "Total number of fallback server registrations, labeled by outcome.", &["outcome"]).unwrap();
    /// The size of the most recently reconciled server list.
    pub static ref SERVER_LIST_SIZE: Gauge =
        register_gauge!("convoy_server_list_size", "Number of server addresses returned by the last server list query.").unwrap();

    /// A histogram of directory request latencies.
    pub static ref DIRECTORY_REQUEST_LATENCY_SECONDS: Histogram =
        register_histogram!("convoy_directory_request_latency_seconds", "Latency of directory requests in seconds.").unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| format!("# failed to encode metrics: {e}\n"))
}
