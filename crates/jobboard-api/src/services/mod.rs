//! Business logic services.

pub mod job;
pub mod user;

pub use job::JobService;
pub use user::{Credentials, SeedOutcome, UserService};
