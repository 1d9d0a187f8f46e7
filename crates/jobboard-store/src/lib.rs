//! Document storage for the job board.
//!
//! This crate provides:
//! - A backend-neutral filter AST with Mongo-style rendering and an
//!   in-memory matcher
//! - The job listing query builder
//! - A Data API HTTP client with retry and metrics
//! - An in-memory store for development and tests
//! - Typed repositories for jobs and users

pub mod client;
pub mod error;
pub mod filter;
pub mod job_query;
pub mod memory;
pub mod metrics;
pub mod pattern;
pub mod repos;
pub mod retry;
pub mod sorting;
pub mod store;
pub mod types;


pub use client::{DataApiClient, DataApiConfig};
pub use error::{StoreError, StoreResult};
pub use filter::{Condition, Filter, Matcher};
pub use job_query::build_job_filter;
pub use memory::MemoryStore;
pub use pattern::{escape_pattern, Pattern};
pub use repos::{JobRepository, UserRepository};
pub use retry::RetryConfig;
pub use sorting::{SortDirection, SortSpec};
pub use store::{collections, DocumentStore, StoreBackend, StoreConfig};
