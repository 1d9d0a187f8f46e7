//! Shared data models for the job board backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and salary ranges
//! - Users and roles
//! - Typed job listing filters parsed from raw query parameters

pub mod error;
pub mod job;
pub mod job_filter;
pub mod user;
pub mod utils;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use job::{Job, JobChanges, JobId, JobType, JobUpdate, NewJob, SalaryPeriod, SalaryRange};
pub use job_filter::{JobFilterRequest, JobListQuery};
pub use user::{PublicUser, Role, User, UserId};
pub use utils::slugify;
