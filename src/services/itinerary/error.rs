use thiserror::Error;

use crate::repos::RepoError;
use crate::services::cache::LockError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("access denied")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    // Another writer holds the resource, or the lock state could not be verified.
    #[error("resource '{0}' is busy")]
    Busy(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Map a repo error, turning `RepoError::NotFound` into a named 404.
    pub fn or_missing(resource: &'static str) -> impl FnOnce(RepoError) -> ServiceError {
        move |e| match e {
            RepoError::NotFound => ServiceError::NotFound(resource),
            other => ServiceError::Repo(other),
        }
    }
}

impl From<LockError> for ServiceError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Held { name } => ServiceError::Busy(name),
            LockError::Store { name, source } => {
                tracing::warn!(lock = %name, error = %source, "lock state unknown; rejecting write");
                ServiceError::Busy(name)
            }
        }
    }
}
