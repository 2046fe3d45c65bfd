//! Client error types.

use fit_amigo_core::ValidationError;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by [`crate::FitAmigoClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend facade is not connected yet.
    #[error("Backend connection is not ready")]
    NotReady,

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend call failed.
    #[error(transparent)]
    Remote(#[from] BackendError),

    /// The payload failed validation before any call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_becomes_invalid_input() {
        let err: ClientError = ValidationError::new("price", "must be greater than zero").into();
        assert_eq!(err.to_string(), "Invalid input: price must be greater than zero");
    }

    #[test]
    fn test_remote_error_is_transparent() {
        let err: ClientError = BackendError::RateLimited(5).into();
        assert_eq!(err.to_string(), "Rate limited, retry after 5 seconds");
    }
}
