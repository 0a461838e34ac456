//! Error types shared by the planner, the stores and the HTTP layer.

use thiserror::Error;

/// Errors that can occur while reading or mutating a student's plan.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    /// Input was rejected locally; nothing was sent to the store
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The store failed to apply or return a change
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// A referenced subject, grade or schedule entry does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },
}

impl PlannerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        PlannerError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        PlannerError::Persistence {
            message: message.into(),
        }
    }

    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        PlannerError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Returns true if the error was raised before reaching the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, PlannerError::Validation { .. })
    }

    /// Returns true if the affected listing should be re-fetched to reconcile.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, PlannerError::NotFound { .. })
    }

    /// Returns true if repeating the same user action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::Persistence { .. } | PlannerError::NotFound { .. }
        )
    }
}

impl From<rusqlite::Error> for PlannerError {
    fn from(err: rusqlite::Error) -> Self {
        PlannerError::Persistence {
            message: err.to_string(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for PlannerError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        PlannerError::Persistence {
            message: format!("store lock poisoned: {err}"),
        }
    }
}

/// Errors raised while loading or validating the curriculum catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Subject code {code} is defined more than once")]
    DuplicateCode { code: String },

    #[error("Subject {subject} lists unknown prerequisite {prerequisite}")]
    DanglingPrerequisite {
        subject: String,
        prerequisite: String,
    },

    #[error("Subject {code} lists itself as a prerequisite")]
    SelfPrerequisite { code: String },

    #[error("Prerequisite cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}
