use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Checking a connection out of the pool failed.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// A stored row could not be converted into its domain type.
    #[error("stored value violates a domain constraint: {0}")]
    Constraint(#[from] TypeConstraintError),
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
