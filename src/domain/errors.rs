//! Domain errors for the Flywheel automation engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the Flywheel system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Slug '{slug}' already exists in project {project_id}")]
    DuplicateSlug { project_id: Uuid, slug: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
