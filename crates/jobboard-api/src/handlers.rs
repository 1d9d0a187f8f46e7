//! Request handlers.

pub mod auth;
pub mod health;
pub mod jobs;

pub use auth::*;
pub use health::*;
pub use jobs::*;
