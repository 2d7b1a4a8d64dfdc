//! Repository error type.

use thiserror::Error;

/// Failure raised by a repository or unit of work.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate key in table {0}")]
    DuplicateKey(&'static str),

    #[error("Transaction already completed")]
    TransactionClosed,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// True for primary-key or unique-index collisions.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RepositoryError::DuplicateKey(_) => true,
            RepositoryError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}
