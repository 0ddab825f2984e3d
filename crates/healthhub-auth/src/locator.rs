//! Record locator: one lookup entry point for the three patient keys.
//!
//! The query shape picks the lookup path; exactly one path runs per query.
//! A numeric query is a national health id, a UUID is the patient's user
//! id, anything else is treated as a QR badge token. Misses on any path
//! surface as the same `RecordNotFound`.

use healthhub_core::{Patient, UserId};
use healthhub_storage::DynRegistryStorage;
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Clone)]
pub struct RecordLocator {
    registry: DynRegistryStorage,
}

impl RecordLocator {
    pub fn new(registry: DynRegistryStorage) -> Self {
        Self { registry }
    }

    /// Resolves a patient by national health id, user id or QR token.
    /// Read-only.
    pub async fn locate(&self, query: &str) -> Result<Patient, AuthError> {
        let query = query.trim();

        let found = if let Ok(national_id) = query.parse::<i64>() {
            self.registry.find_patient_by_national_id(national_id).await?
        } else if let Ok(uuid) = query.parse::<Uuid>() {
            self.registry.get_patient(UserId::from(uuid)).await?
        } else {
            self.registry.find_patient_by_qr_token(query).await?
        };

        found.ok_or(AuthError::RecordNotFound)
    }
}
