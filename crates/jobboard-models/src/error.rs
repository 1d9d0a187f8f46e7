//! Model validation errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid job type: {0}")]
    InvalidJobType(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("{0}")]
    MissingField(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
