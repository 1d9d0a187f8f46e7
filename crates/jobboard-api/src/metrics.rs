//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Install the Prometheus recorder. Fails if a recorder is already set.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "jobboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobboard_http_requests_in_flight";

    // Auth metrics
    pub const AUTH_EVENTS_TOTAL: &str = "jobboard_auth_events_total";

    // Job metrics
    pub const JOB_SEARCH_RESULTS: &str = "jobboard_job_search_results";
    pub const JOBS_CHANGED_TOTAL: &str = "jobboard_jobs_changed_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "jobboard_rate_limit_hits_total";
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a register/login/logout outcome.
pub fn record_auth_event(event: &'static str, outcome: &'static str) {
    counter!(names::AUTH_EVENTS_TOTAL, "event" => event, "outcome" => outcome).increment(1);
}

/// Record how many jobs a listing returned and which filters were used.
pub fn record_job_search(result_count: usize, filtered: bool) {
    let labels = [("filtered", if filtered { "true" } else { "false" }.to_string())];
    histogram!(names::JOB_SEARCH_RESULTS, &labels).record(result_count as f64);
}

/// Record a job create, update or delete.
pub fn record_job_change(action: &'static str) {
    counter!(names::JOBS_CHANGED_TOTAL, "action" => action).increment(1);
}

pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static JOB_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/jobs/[^/]+").unwrap());

/// Collapse ids in a path so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, ":id");
    JOB_SEGMENT.replace_all(&path, "/jobs/:id").into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
