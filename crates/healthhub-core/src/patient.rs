//! Hospital registry entities: hospitals, patients and medical records.

use crate::id::{HospitalId, RecordId, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub place: String,
}

impl Hospital {
    pub fn new(name: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            id: HospitalId::new(),
            name: name.into(),
            place: place.into(),
        }
    }
}

/// A registered patient. The patient's account id doubles as the patient id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub user_id: UserId,
    /// National health id (NSS). Unique across the registry.
    pub national_health_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub birth_date: OffsetDateTime,
    pub address: String,
    pub phone: String,
    pub insurer: String,
    pub emergency_contact: String,
    /// Assigned physician. A newly registered patient may not have one yet.
    pub assigned_doctor_id: Option<UserId>,
    pub hospital_id: HospitalId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A patient's dossier. Exactly one per patient, created in the same
/// transaction as the patient itself. Never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: RecordId,
    pub patient_id: UserId,
    pub active: bool,
    /// Opaque token embedded in the patient's QR badge. The visual encoding
    /// is produced elsewhere; the backend only resolves the token.
    pub qr_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MedicalRecord {
    /// Build the record for a freshly registered patient.
    pub fn for_patient(patient_id: UserId) -> Self {
        Self {
            id: RecordId::new(),
            patient_id,
            active: true,
            qr_token: Uuid::new_v4().simple().to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
