use thiserror::Error;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The user is not authorized to perform the operation.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The operation conflicts with existing state (duplicate name, cyclic
    /// parent assignment, deletion blocked by dependents).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Submitted data failed domain validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
