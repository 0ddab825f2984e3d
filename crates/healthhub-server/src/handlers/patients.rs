//! Patient lookup and the dossier view.
//!
//! These endpoints resolve `{query}` through the record locator (national
//! health id, user id or QR token) and run the access policy. A denial is
//! surfaced as a 404 here so an unauthorized caller cannot probe which
//! records exist; the internal signals stay distinct and logged.

use axum::Json;
use axum::extract::{Path, State};
use healthhub_api::{ApiError, ApiResponse, ApiResult};
use healthhub_auth::{AccessDecision, BearerPrincipal};
use healthhub_core::{
    Consultation, HealthMetric, MedicalRecord, Patient, Principal,
};
use healthhub_workflow::{ConsultationDraft, ConsultationOutcome};
use serde::Serialize;

use crate::state::AppState;

/// Locator plus policy, with `Forbidden` reshaped into `NotFound`.
pub(crate) async fn authorized_patient(
    state: &AppState,
    principal: Principal,
    query: &str,
) -> Result<Patient, ApiError> {
    let patient = state.locator.locate(query).await.map_err(ApiError::from)?;
    match healthhub_auth::evaluate(principal, &patient) {
        AccessDecision::Allow(_) => Ok(patient),
        AccessDecision::Deny(reason) => {
            Err(ApiError::forbidden(reason.to_string()).conceal_forbidden())
        }
    }
}

pub async fn get_patient(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(query): Path<String>,
) -> ApiResult<Patient> {
    let patient = authorized_patient(&state, principal, &query).await?;
    Ok(ApiResponse::ok(patient))
}

#[derive(Debug, Serialize)]
pub struct DossierView {
    pub record: MedicalRecord,
    pub consultations: Vec<Consultation>,
    pub metrics: Vec<HealthMetric>,
}

pub async fn get_dossier(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(query): Path<String>,
) -> ApiResult<DossierView> {
    let patient = authorized_patient(&state, principal, &query).await?;
    let record = state
        .registry
        .get_record(patient.user_id)
        .await?
        .ok_or_else(|| ApiError::internal(format!("patient {} has no record", patient.user_id)))?;
    let consultations = state.clinical.consultations_for_record(record.id).await?;
    let metrics = state.clinical.metrics_for_record(record.id).await?;
    Ok(ApiResponse::ok(DossierView {
        record,
        consultations,
        metrics,
    }))
}

pub async fn create_consultation(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(query): Path<String>,
    Json(draft): Json<ConsultationDraft>,
) -> ApiResult<ConsultationOutcome> {
    let patient = authorized_patient(&state, principal, &query).await?;
    let outcome = state
        .engine
        .create_consultation(principal, &patient, draft)
        .await?;
    Ok(ApiResponse::created(outcome))
}
