//! Authenticated principals, user accounts and role profiles.
//!
//! The legacy system attached role profiles to users through a
//! create-profile-on-user-save signal. Here a user and its profile are built
//! together by [`Principal::create`] and persisted as one unit, so a user
//! without a matching profile cannot exist.

use crate::error::CoreError;
use crate::id::{HospitalId, UserId};
use crate::role::Role;
use serde::{Deserialize, Serialize};

/// The identity attached to an authenticated request. Immutable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub hospital_id: HospitalId,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role, hospital_id: HospitalId) -> Self {
        Self {
            user_id,
            role,
            hospital_id,
        }
    }

    /// Explicit factory replacing the legacy post-save hook: builds the user
    /// account and its role profile as one unit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the profile does not match `role`.
    pub fn create(
        username: impl Into<String>,
        role: Role,
        hospital_id: HospitalId,
        profile: RoleProfile,
    ) -> Result<(User, RoleProfile), CoreError> {
        if profile.role() != role {
            return Err(CoreError::validation(format!(
                "profile kind {} does not match role {role}",
                profile.role()
            )));
        }
        let user = User {
            id: UserId::new(),
            username: username.into(),
            role,
            hospital_id,
        };
        Ok((user, profile))
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub hospital_id: HospitalId,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role, self.hospital_id)
    }
}

/// Work shift of clinical staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Day,
    Night,
    Rotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub specialty: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NurseProfile {
    pub shift: Shift,
    pub specialty: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacistProfile {
    pub shift: Shift,
    pub phone: String,
}

/// Profile shared by lab technicians and radiologists: both carry a running
/// counter of tests still assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechProfile {
    pub shift: Shift,
    pub specialty: String,
    pub phone: String,
    pub pending_tests: u32,
}

/// Role-specific profile data, stored alongside the user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleProfile {
    Doctor(DoctorProfile),
    Nurse(NurseProfile),
    LabTech(TechProfile),
    Radiologist(TechProfile),
    Pharmacist(PharmacistProfile),
    Admin,
    Patient,
}

impl RoleProfile {
    /// The role this profile belongs to.
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Doctor(_) => Role::Doctor,
            RoleProfile::Nurse(_) => Role::Nurse,
            RoleProfile::LabTech(_) => Role::LabTech,
            RoleProfile::Radiologist(_) => Role::Radiologist,
            RoleProfile::Pharmacist(_) => Role::Pharmacist,
            RoleProfile::Admin => Role::Admin,
            RoleProfile::Patient => Role::Patient,
        }
    }
}
