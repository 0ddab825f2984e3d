use thiserror::Error;

/// Core error types for HealthHub domain operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] time::error::Parse),

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Illegal {entity} transition: {from} -> {to}")]
    IllegalTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new IllegalTransition error
    pub fn illegal_transition(entity: &'static str, from: &'static str, to: &'static str) -> Self {
        Self::IllegalTransition { entity, from, to }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownRole(_) | Self::InvalidId(_) | Self::InvalidTimestamp(_) => {
                ErrorCategory::Validation
            }
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::IllegalTransition { .. } => ErrorCategory::Workflow,
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Workflow,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Workflow => write!(f, "workflow"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
