//! Repository error types
//!
//! Data services report failures with [`RepositoryError`]; repositories propagate them
//! untouched. Write operations never turn a failed validation into an error: that path
//! returns `Ok(false)` instead.
//!
//! # Example
//!
//! ```rust
//! use request_management::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("CallSheet", "42");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Data-service call being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Single lookup by identity
    SelectById,
    /// Unpaged query with a predicate
    SelectBy,
    /// Paged query with a predicate
    SelectPaged,
    /// Batch lookup by column values
    SelectByColumnIds,
    /// Inserting an entity
    Insert,
    /// Updating an entity
    Update,
    /// Deleting an entity
    Delete,
    /// Projecting entities to models
    Map,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectById => write!(f, "select_by_id"),
            Self::SelectBy => write!(f, "select_by"),
            Self::SelectPaged => write!(f, "select_paged"),
            Self::SelectByColumnIds => write!(f, "select_by_column_ids"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Storage constraint violation (unique, foreign key, check)
    ConstraintViolation,
    /// Failed to reach the data service backend
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Failure reported by the underlying data service
    DataServiceError,
    /// Entity to model projection failed
    MappingFailed,
    /// The worker running a blocking data-service call panicked or was cancelled
    TaskFailed,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DataServiceError => write!(f, "data_service_error"),
            Self::MappingFailed => write!(f, "mapping_failed"),
            Self::TaskFailed => write!(f, "task_failed"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
///
/// ```rust
/// use request_management::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::constraint_violation(
///     RepositoryOperation::Insert,
///     "duplicate call sheet number",
/// )
/// .with_entity("CallSheet", "17");
/// assert_eq!(
///     error.to_string(),
///     "Repository constraint_violation error during insert: duplicate call sheet number [CallSheet: 17]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "ProgramRequest")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::SelectById,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ConnectionFailed, message)
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a generic data-service error
    pub fn data_service(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DataServiceError, message)
    }

    /// Create a mapping error
    pub fn mapping_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Map,
            RepositoryErrorKind::MappingFailed,
            message,
        )
    }

    /// Create an error for a blocking worker that did not complete
    pub fn task_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::TaskFailed, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    ///
    /// Nothing in this crate retries; the flag is for callers that want to.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            "data service call panicked".to_string()
        } else {
            format!("data service call did not complete: {}", err)
        };
        // The caller knows which operation was running and overrides this.
        Self::task_failed(RepositoryOperation::SelectBy, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_operation_display() {
        assert_eq!(format!("{}", RepositoryOperation::SelectById), "select_by_id");
        assert_eq!(format!("{}", RepositoryOperation::SelectPaged), "select_paged");
        assert_eq!(
            format!("{}", RepositoryOperation::SelectByColumnIds),
            "select_by_column_ids"
        );
        assert_eq!(format!("{}", RepositoryOperation::Insert), "insert");
        assert_eq!(format!("{}", RepositoryOperation::Delete), "delete");
    }

    #[test]
    fn test_error_display_without_entity() {
        let error = RepositoryError::timeout(RepositoryOperation::SelectPaged, "gave up after 30s");
        assert_eq!(
            error.to_string(),
            "Repository timeout error during select_paged: gave up after 30s"
        );
    }

    #[test]
    fn test_not_found_carries_entity() {
        let error = RepositoryError::not_found("ProgramRequest", "7");
        assert_eq!(error.operation, RepositoryOperation::SelectById);
        assert_eq!(error.entity_type.as_deref(), Some("ProgramRequest"));
        assert_eq!(error.entity_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_with_operation_overrides() {
        let error = RepositoryError::connection_failed(RepositoryOperation::SelectBy, "refused")
            .with_operation(RepositoryOperation::Update);
        assert_eq!(error.operation, RepositoryOperation::Update);
    }

    #[test]
    fn test_is_retriable() {
        assert!(RepositoryError::connection_failed(RepositoryOperation::Insert, "reset").is_retriable());
        assert!(RepositoryError::timeout(RepositoryOperation::Insert, "slow").is_retriable());
        assert!(!RepositoryError::not_found("CallSheet", "1").is_retriable());
        assert!(!RepositoryError::mapping_failed("bad shape").is_retriable());
    }
}
