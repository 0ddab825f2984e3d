//! Nurse care activities.

use axum::Json;
use axum::extract::{Path, State};
use healthhub_api::{ApiError, ApiResponse, ApiResult};
use healthhub_auth::BearerPrincipal;
use healthhub_core::{ActivityId, ActivityKind, CareActivity, ConsultationId, Role, UserId};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanActivityRequest {
    pub nurse_id: UserId,
    pub activity: ActivityKind,
    #[serde(default)]
    pub doctor_details: String,
}

/// Doctor plans a care activity on one of their consultations.
pub async fn plan_activity(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(consultation_id): Path<ConsultationId>,
    Json(req): Json<PlanActivityRequest>,
) -> ApiResult<CareActivity> {
    let planned = state
        .engine
        .plan_activity(
            principal,
            consultation_id,
            req.nurse_id,
            req.activity,
            req.doctor_details,
        )
        .await?;
    Ok(ApiResponse::created(planned))
}

pub async fn list_activities(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
) -> ApiResult<Vec<CareActivity>> {
    if principal.role != Role::Nurse {
        return Err(ApiError::forbidden("nurse access required"));
    }
    let activities = state.engine.activities_for(principal).await?;
    Ok(ApiResponse::ok(activities))
}

pub async fn start_activity(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ActivityId>,
) -> ApiResult<CareActivity> {
    let activity = state.engine.start_activity(principal, id).await?;
    Ok(ApiResponse::ok(activity))
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteActivityRequest {
    #[serde(default)]
    pub observations: String,
}

pub async fn complete_activity(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<ActivityId>,
    Json(req): Json<CompleteActivityRequest>,
) -> ApiResult<CareActivity> {
    let activity = state
        .engine
        .complete_activity(principal, id, req.observations)
        .await?;
    Ok(ApiResponse::ok(activity))
}
