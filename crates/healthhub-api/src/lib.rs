//! HTTP API plumbing shared by the HealthHub handlers: the error type
//! with its status mapping, the JSON problem body, and the response
//! wrapper.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use healthhub_auth::AuthError;
use healthhub_storage::StorageError;
use healthhub_workflow::WorkflowError;
use serde::Serialize;
use thiserror::Error;

/// JSON problem body carried by every error response.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub error: &'static str,
    pub message: String,
}

/// High-level API errors mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn unprocessable_entity(msg: impl Into<String>) -> Self {
        Self::UnprocessableEntity(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::UnprocessableEntity(_) => "validation_failed",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Reshapes a `Forbidden` into a `NotFound` for endpoints where a 403
    /// would confirm that the record exists. The denial is still logged.
    pub fn conceal_forbidden(self) -> Self {
        match self {
            ApiError::Forbidden(message) => {
                tracing::info!(reason = %message, "denial surfaced as not-found");
                ApiError::NotFound("Patient record not found".into())
            }
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // internals stay in the log, not on the wire
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Problem {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound { .. } => Self::NotFound(err.to_string()),
            WorkflowError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            WorkflowError::Validation { .. } => Self::UnprocessableEntity(err.to_string()),
            WorkflowError::IllegalTransition { .. } | WorkflowError::ConflictingState { .. } => {
                Self::Conflict(err.to_string())
            }
            WorkflowError::Storage(storage) => storage.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::InvalidToken
            | AuthError::InvalidServiceKey => Self::Unauthorized(err.to_string()),
            AuthError::Forbidden(reason) => Self::Forbidden(reason.to_string()),
            AuthError::RecordNotFound => Self::NotFound(err.to_string()),
            AuthError::Storage(storage) => storage.into(),
        }
    }
}

/// A JSON response with an explicit status, for handlers that create
/// things.
pub struct ApiResponse<T>(pub StatusCode, pub T);

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(value: T) -> Self {
        Self(StatusCode::OK, value)
    }

    pub fn created(value: T) -> Self {
        Self(StatusCode::CREATED, value)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        assert_eq!(
            ApiError::from(WorkflowError::not_found("Examen", "x")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(WorkflowError::forbidden("no")).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(WorkflowError::validation("missing dose")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(WorkflowError::conflict("already done")).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::backend("io")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn concealing_forbidden_looks_like_a_miss() {
        let err = ApiError::forbidden("nurse x may not access patient y").conceal_forbidden();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("not found"));

        // other variants pass through untouched
        let err = ApiError::conflict("taken").conceal_forbidden();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn auth_rejections_become_401() {
        assert_eq!(
            ApiError::from(AuthError::MissingCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::RecordNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn storage_conflicts_become_409() {
        let err = ApiError::from(StorageError::already_exists("Patient", 123));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
