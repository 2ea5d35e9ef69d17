//! Mapping and validation service contracts
//!
//! Model repositories consume these; implementations live with the application.

use std::fmt;

use async_trait::async_trait;

use crate::repository::RepositoryResult;

/// Named group of validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RuleSet {
    /// Rules applied before any write reaches the data service
    Update,
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
        }
    }
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

/// Rejection of a model (or a batch of models) by the validation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub model: String,
    pub failures: Vec<ValidationFailure>,
}

impl ValidationError {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_failure(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push(ValidationFailure {
            field: field.into(),
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {}", self.model)?;
        for (i, failure) in self.failures.iter().enumerate() {
            let separator = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", separator, failure.field, failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Projects entities `E` onto application models `M`
#[async_trait]
pub trait MappingService<E, M>: Send + Sync {
    async fn map_one(&self, entity: E) -> RepositoryResult<M>;

    async fn map_many(&self, entities: Vec<E>) -> RepositoryResult<Vec<M>>;
}

/// Validates models before writes and after reads
#[async_trait]
pub trait ValidationService<M>: Send + Sync {
    /// Validate `model` against `rule_sets`
    ///
    /// Returns the (possibly normalized) model, or the reason it was rejected.
    async fn validate(
        &self,
        model: M,
        rule_sets: &[RuleSet],
        is_update: bool,
    ) -> Result<M, ValidationError>;

    /// Validate models produced by a read
    async fn validate_results(&self, models: &mut [M]) -> Result<(), ValidationError>;
}
