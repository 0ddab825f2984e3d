use thiserror::Error;

/// Errors produced by storage backends.
///
/// Backends return `Ok(None)` for plain misses on read paths; `NotFound` is
/// reserved for operations that require the row to exist (updates,
/// deactivation, counter operations).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Whether the error indicates a missing row rather than a backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_key() {
        let err = StorageError::not_found("Patient", 12345);
        assert_eq!(err.to_string(), "Patient not found: 12345");
        assert!(err.is_not_found());
    }

    #[test]
    fn conflict_is_not_a_miss() {
        let err = StorageError::already_exists("Medication", "paracetamol/tablet");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("already exists"));
    }
}
