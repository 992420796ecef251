//! Application error types

use thiserror::Error;
use pulse_domain::DomainError;

/// Application-level errors.
///
/// Transport failures are not listed here: they end a run with a
/// `FailureNotice` instead of an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A run was triggered while another one was still in progress.
    #[error("a run is already in progress")]
    AlreadyRunning,
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
