//! Store metrics: request counts, latency and retries per operation.

use metrics::{counter, histogram};

pub mod names {
    /// Store requests by backend, operation and status.
    pub const REQUESTS_TOTAL: &str = "store_requests_total";

    /// Retried store operations.
    pub const RETRIES_TOTAL: &str = "store_retries_total";

    /// Store request latency in seconds.
    pub const LATENCY_SECONDS: &str = "store_latency_seconds";
}

/// Record a completed store request.
pub fn record_request(backend: &'static str, operation: &str, status: u16, latency_secs: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "backend" => backend,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "backend" => backend,
        "operation" => operation.to_string()
    )
    .record(latency_secs);
}

pub fn record_retry(operation: &str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}
