//! Prescription endpoints for the external pharmacy service.
//!
//! Authenticated by the `x-service-key` header, not a user session.

use axum::extract::{Path, State};
use healthhub_api::{ApiResponse, ApiResult};
use healthhub_auth::PharmacyService;
use healthhub_core::{Ordonnance, OrdonnanceId};
use healthhub_workflow::OrdonnanceDetail;

use crate::state::AppState;

pub async fn list_unvalidated(
    State(state): State<AppState>,
    _service: PharmacyService,
) -> ApiResult<Vec<Ordonnance>> {
    let ordonnances = state.engine.unvalidated_ordonnances().await?;
    Ok(ApiResponse::ok(ordonnances))
}

pub async fn get_ordonnance(
    State(state): State<AppState>,
    _service: PharmacyService,
    Path(id): Path<OrdonnanceId>,
) -> ApiResult<OrdonnanceDetail> {
    let detail = state.engine.ordonnance_detail(id).await?;
    Ok(ApiResponse::ok(detail))
}

pub async fn validate_ordonnance(
    State(state): State<AppState>,
    _service: PharmacyService,
    Path(id): Path<OrdonnanceId>,
) -> ApiResult<Ordonnance> {
    let ordonnance = state.engine.validate_ordonnance(id).await?;
    Ok(ApiResponse::ok(ordonnance))
}
