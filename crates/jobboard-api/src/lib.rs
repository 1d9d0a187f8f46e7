//! Axum HTTP API server for the job board.
//!
//! This crate provides:
//! - Job listing, search and admin job management
//! - Cookie-based JWT sessions with Argon2 password hashing
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{JobService, UserService};
pub use state::AppState;
