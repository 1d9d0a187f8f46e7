//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    create_job, delete_job, get_job, health, list_jobs, login, logout, me, ready, register,
    update_job,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Credential endpoints get their own, stricter limiter.
    let auth_rate_limiter = Arc::new(RateLimiterCache::new(state.config.auth_rate_limit_rps));
    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let credential_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(middleware::from_fn_with_state(
            auth_rate_limiter,
            rate_limit_middleware,
        ));

    let session_routes = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me));

    let job_routes = Router::new()
        .route("/createJob", post(create_job))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job).put(update_job).delete(delete_job));

    let api_routes = Router::new()
        .merge(credential_routes)
        .merge(session_routes)
        .merge(job_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
