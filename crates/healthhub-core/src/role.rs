//! The closed role model.
//!
//! The legacy system compared role strings all over the codebase, with
//! inconsistent casing. Roles here are a closed enum, parsed once at the
//! boundary and matched exhaustively everywhere else.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated principal. Exactly one per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Nurse,
    LabTech,
    Radiologist,
    Pharmacist,
    Admin,
    Patient,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Doctor,
        Role::Nurse,
        Role::LabTech,
        Role::Radiologist,
        Role::Pharmacist,
        Role::Admin,
        Role::Patient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::LabTech => "lab_tech",
            Role::Radiologist => "radiologist",
            Role::Pharmacist => "pharmacist",
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }

    /// Hospital staff roles: everyone with a clinical function, i.e. every
    /// role except `Admin` and `Patient`.
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Role::Doctor | Role::Nurse | Role::LabTech | Role::Radiologist | Role::Pharmacist
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Case-insensitive and whitespace-tolerant: stored role strings in the
    /// legacy data were cased inconsistently.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "lab_tech" => Ok(Role::LabTech),
            "radiologist" => Ok(Role::Radiologist),
            "pharmacist" => Ok(Role::Pharmacist),
            "admin" => Ok(Role::Admin),
            "patient" => Ok(Role::Patient),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}
