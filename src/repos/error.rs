/*
 * Responsibility
 * - What the repo layer reports upward (driver failure vs. missing row)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("row not found")]
    NotFound,
}
