//! Error types

use thiserror::Error;

use crate::repository::RepositoryError;
use crate::services::ValidationError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Structured repository error with operation context
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Model rejected by the validation service
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// JWT error (requires `jwt` feature)
    #[cfg(feature = "jwt")]
    #[error("JWT error: {0}")]
    Jwt(Box<jsonwebtoken::errors::Error>),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(feature = "jwt")]
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Jwt(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_repository_error_converts() {
        let err: Error = RepositoryError::data_service(RepositoryOperation::Insert, "disk full").into();
        assert!(matches!(err, Error::Repository(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: Error = ValidationError::new("CallSheet").with_failure("name", "is required").into();
        assert_eq!(err.to_string(), "Validation failed for CallSheet: name: is required");
    }
}
