//! Authentication and authorization errors.
//!
//! `AuthError` implements `IntoResponse` so extractors can reject requests
//! directly with a JSON problem body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use healthhub_storage::StorageError;
use serde_json::json;
use thiserror::Error;

use crate::policy::DenyReason;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("Invalid or missing service key")]
    InvalidServiceKey,

    #[error("Access denied: {0}")]
    Forbidden(DenyReason),

    /// Locator miss. Every failed lookup collapses into this one signal so
    /// callers cannot distinguish "no such patient" from "wrong key shape".
    #[error("Patient record not found")]
    RecordNotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidToken | Self::InvalidServiceKey => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RecordNotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidToken => "invalid_token",
            Self::InvalidServiceKey => "invalid_service_key",
            Self::Forbidden(_) => "forbidden",
            Self::RecordNotFound => "not_found",
            Self::Storage(_) => "internal",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // storage details stay in the log, not the wire
        let message = match &self {
            Self::Storage(err) => {
                tracing::error!(error = %err, "storage failure during authentication");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = json!({
            "error": self.code(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            AuthError::MissingCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::RecordNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Storage(StorageError::backend("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
