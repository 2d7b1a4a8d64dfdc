//! Error type shared by every domain service.

use persistence::RepositoryError;
use shared::jwt::JwtError;
use shared::password::PasswordError;
use shared::validation::IdError;
use thiserror::Error;
use validator::ValidationErrors;

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidFields(#[from] ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<IdError> for ServiceError {
    fn from(err: IdError) -> Self {
        ServiceError::Validation(err.message)
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
