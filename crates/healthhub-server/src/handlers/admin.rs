//! Administration: hospitals, accounts, patient registration.

use axum::Json;
use axum::extract::{Path, State};
use healthhub_api::{ApiError, ApiResponse, ApiResult};
use healthhub_auth::BearerPrincipal;
use healthhub_core::{
    Hospital, HospitalId, MedicalRecord, Patient, Principal, Role, RoleProfile, User, UserId,
};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::state::AppState;

fn require_admin(principal: Principal) -> Result<(), ApiError> {
    if principal.role != Role::Admin {
        return Err(ApiError::forbidden("administrator access required"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateHospitalRequest {
    pub name: String,
    pub place: String,
}

pub async fn create_hospital(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Json(req): Json<CreateHospitalRequest>,
) -> ApiResult<Hospital> {
    require_admin(principal)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::unprocessable_entity("hospital name is required"));
    }
    let hospital = Hospital::new(req.name, req.place);
    state.registry.insert_hospital(&hospital).await?;
    Ok(ApiResponse::created(hospital))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub role: Role,
    pub hospital_id: HospitalId,
    pub profile: RoleProfile,
    /// Pre-issued bearer token to seed for this account. Issuing real
    /// tokens is the auth collaborator's job.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub user: User,
    pub profile: RoleProfile,
}

pub async fn create_user(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<UserView> {
    require_admin(principal)?;
    state
        .registry
        .get_hospital(req.hospital_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Hospital not found: {}", req.hospital_id)))?;

    let (user, profile) = Principal::create(req.username, req.role, req.hospital_id, req.profile)
        .map_err(|err| ApiError::unprocessable_entity(err.to_string()))?;
    state.registry.insert_principal(&user, &profile).await?;
    if let Some(token) = req.token {
        state.registry.insert_token(&token, user.principal()).await?;
    }
    Ok(ApiResponse::created(UserView { user, profile }))
}

pub async fn get_user(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<UserId>,
) -> ApiResult<UserView> {
    require_admin(principal)?;
    let user = state
        .registry
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {id}")))?;
    let profile = state
        .registry
        .get_profile(id)
        .await?
        .ok_or_else(|| ApiError::internal(format!("user {id} has no profile")))?;
    Ok(ApiResponse::ok(UserView { user, profile }))
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub national_health_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub birth_date: OffsetDateTime,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub insurer: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub assigned_doctor_id: Option<UserId>,
    pub hospital_id: HospitalId,
}

/// Registration result: the patient, their dossier, and the bearer token
/// for the patient session.
#[derive(Debug, Serialize)]
pub struct RegisteredPatient {
    pub patient: Patient,
    pub record: MedicalRecord,
    pub token: String,
}

pub async fn create_patient(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Json(req): Json<CreatePatientRequest>,
) -> ApiResult<RegisteredPatient> {
    require_admin(principal)?;
    state
        .registry
        .get_hospital(req.hospital_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Hospital not found: {}", req.hospital_id)))?;
    if let Some(doctor_id) = req.assigned_doctor_id {
        let doctor = state
            .registry
            .get_user(doctor_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User not found: {doctor_id}")))?;
        if doctor.role != Role::Doctor {
            return Err(ApiError::unprocessable_entity(format!(
                "assigned_doctor_id refers to a {}, not a doctor",
                doctor.role
            )));
        }
    }

    let patient = Patient {
        user_id: UserId::new(),
        national_health_id: req.national_health_id,
        first_name: req.first_name,
        last_name: req.last_name,
        birth_date: req.birth_date,
        address: req.address,
        phone: req.phone,
        insurer: req.insurer,
        emergency_contact: req.emergency_contact,
        assigned_doctor_id: req.assigned_doctor_id,
        hospital_id: req.hospital_id,
        created_at: OffsetDateTime::now_utc(),
    };
    let record = MedicalRecord::for_patient(patient.user_id);
    state.registry.insert_patient(&patient, &record).await?;

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();
    state
        .registry
        .insert_token(
            &token,
            Principal::new(patient.user_id, Role::Patient, patient.hospital_id),
        )
        .await?;

    tracing::info!(patient_id = %patient.user_id, "patient registered");
    Ok(ApiResponse::created(RegisteredPatient {
        patient,
        record,
        token,
    }))
}

pub async fn deactivate_dossier(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
    Path(id): Path<UserId>,
) -> ApiResult<MedicalRecord> {
    require_admin(principal)?;
    state.registry.deactivate_record(id).await?;
    let record = state
        .registry
        .get_record(id)
        .await?
        .ok_or_else(|| ApiError::internal(format!("record vanished for patient {id}")))?;
    Ok(ApiResponse::ok(record))
}
