use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by repositories and the services built on them.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No row with that identifier, or the row is soft-deleted.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation on create or update.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User-fixable input problem; the message names the offending input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Opaque failure from the storage driver.
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl RepoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        RepoError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound)
    }
}
