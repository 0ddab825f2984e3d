//! Exam work queues and lifecycle actions.

use axum::Json;
use axum::extract::{Path, Query, State};
use healthhub_api::{ApiError, ApiResponse, ApiResult};
use healthhub_auth::BearerPrincipal;
use healthhub_core::{ExamId, ExamKind, Examen, HealthMetric, LabResultId, Role};
use healthhub_storage::ExamFilter;
use healthhub_workflow::{ExamResultDraft, MetricDraft, SubmittedResult};

use crate::state::AppState;

/// The wing of the hospital this role works in.
fn kind_for(role: Role) -> Result<ExamKind, ApiError> {
    match role {
        Role::LabTech => Ok(ExamKind::Lab),
        Role::Radiologist => Ok(ExamKind::Radiology),
        other => Err(ApiError::forbidden(format!(
            "{other} has no exam work queue"
        ))),
    }
}

/// Work queue scoped to the caller's specialty and hospital, most urgent
/// first. `?status=` and `?priority=` narrow the list.
pub async fn list_exams(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Query(filter): Query<ExamFilter>,
) -> ApiResult<Vec<Examen>> {
    let kind = kind_for(principal.role)?;
    let exams = state
        .clinical
        .exams_for_hospital(kind, principal.hospital_id, &filter)
        .await?;
    Ok(ApiResponse::ok(exams))
}

pub async fn start_exam(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ExamId>,
) -> ApiResult<Examen> {
    let exam = state.engine.start_exam(principal, id).await?;
    Ok(ApiResponse::ok(exam))
}

pub async fn submit_result(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ExamId>,
    Json(draft): Json<ExamResultDraft>,
) -> ApiResult<SubmittedResult> {
    let submitted = state.engine.submit_result(principal, id, draft).await?;
    Ok(ApiResponse::created(submitted))
}

pub async fn validate_exam(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ExamId>,
) -> ApiResult<Examen> {
    let exam = state.engine.validate_exam(principal, id).await?;
    Ok(ApiResponse::ok(exam))
}

pub async fn cancel_exam(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ExamId>,
) -> ApiResult<Examen> {
    let exam = state.engine.cancel_exam(principal, id).await?;
    Ok(ApiResponse::ok(exam))
}

pub async fn record_metric(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<LabResultId>,
    Json(draft): Json<MetricDraft>,
) -> ApiResult<HealthMetric> {
    let metric = state.engine.record_metric(principal, id, draft).await?;
    Ok(ApiResponse::created(metric))
}
