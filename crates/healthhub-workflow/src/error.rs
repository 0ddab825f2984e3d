//! Workflow engine errors.

use healthhub_core::CoreError;
use healthhub_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Illegal {entity} transition: {from} -> {to}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// The entity exists and the request is well-formed, but its current
    /// state does not admit the operation (submitting results to a
    /// terminal exam, validating an exam with no result).
    #[error("Conflicting state: {message}")]
    ConflictingState { message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WorkflowError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictingState {
            message: message.into(),
        }
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IllegalTransition { entity, from, to } => Self::IllegalTransition {
                entity,
                from: from.to_string(),
                to: to.to_string(),
            },
            other => Self::Validation {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use healthhub_core::WorkflowStatus;

    #[test]
    fn core_transition_errors_keep_their_shape() {
        let core = WorkflowStatus::Completed
            .transition("Examen", WorkflowStatus::InProgress)
            .unwrap_err();
        let err = WorkflowError::from(core);
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
        assert_eq!(
            err.to_string(),
            "Illegal Examen transition: termine -> en_cours"
        );
    }

    #[test]
    fn storage_errors_pass_through() {
        let err = WorkflowError::from(StorageError::not_found("Examen", "x"));
        assert!(matches!(err, WorkflowError::Storage(_)));
    }
}
