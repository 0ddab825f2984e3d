use async_trait::async_trait;
use healthhub_core::{
    Hospital, HospitalId, MedicalRecord, Patient, Principal, RecordId, RoleProfile, User, UserId,
};
use healthhub_storage::{RegistryStorage, StorageError};

use crate::storage::InMemoryStorage;

#[async_trait]
impl RegistryStorage for InMemoryStorage {
    async fn insert_hospital(&self, hospital: &Hospital) -> Result<(), StorageError> {
        let guard = self.inner.hospitals.pin();
        if guard.get(&hospital.id).is_some() {
            return Err(StorageError::already_exists("Hospital", hospital.id));
        }
        guard.insert(hospital.id, hospital.clone());
        Ok(())
    }

    async fn get_hospital(&self, id: HospitalId) -> Result<Option<Hospital>, StorageError> {
        Ok(self.inner.hospitals.pin().get(&id).cloned())
    }

    async fn insert_principal(
        &self,
        user: &User,
        profile: &RoleProfile,
    ) -> Result<(), StorageError> {
        let users = self.inner.users.pin();
        if users.get(&user.id).is_some() {
            return Err(StorageError::already_exists("User", user.id));
        }
        users.insert(user.id, user.clone());
        self.inner.profiles.pin().insert(user.id, profile.clone());
        // Techs get a counter slot as soon as they exist
        if matches!(
            profile,
            RoleProfile::LabTech(_) | RoleProfile::Radiologist(_)
        ) {
            self.inner.counters.pin().insert(user.id, 0);
        }
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.inner.users.pin().get(&id).cloned())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<RoleProfile>, StorageError> {
        Ok(self.inner.profiles.pin().get(&id).cloned())
    }

    async fn insert_patient(
        &self,
        patient: &Patient,
        record: &MedicalRecord,
    ) -> Result<(), StorageError> {
        if record.patient_id != patient.user_id {
            return Err(StorageError::backend(
                "medical record does not belong to the patient being inserted",
            ));
        }
        let patients = self.inner.patients.pin();
        if patients.get(&patient.user_id).is_some() {
            return Err(StorageError::already_exists("Patient", patient.user_id));
        }
        let by_nid = self.inner.patients_by_nid.pin();
        if by_nid.get(&patient.national_health_id).is_some() {
            return Err(StorageError::already_exists(
                "Patient",
                patient.national_health_id,
            ));
        }
        patients.insert(patient.user_id, patient.clone());
        by_nid.insert(patient.national_health_id, patient.user_id);
        self.inner
            .records
            .pin()
            .insert(patient.user_id, record.clone());
        self.inner
            .records_by_id
            .pin()
            .insert(record.id, patient.user_id);
        self.inner
            .records_by_token
            .pin()
            .insert(record.qr_token.clone(), patient.user_id);
        Ok(())
    }

    async fn get_patient(&self, id: UserId) -> Result<Option<Patient>, StorageError> {
        Ok(self.inner.patients.pin().get(&id).cloned())
    }

    async fn find_patient_by_national_id(
        &self,
        national_health_id: i64,
    ) -> Result<Option<Patient>, StorageError> {
        let by_nid = self.inner.patients_by_nid.pin();
        let Some(patient_id) = by_nid.get(&national_health_id) else {
            return Ok(None);
        };
        Ok(self.inner.patients.pin().get(patient_id).cloned())
    }

    async fn find_patient_by_qr_token(
        &self,
        token: &str,
    ) -> Result<Option<Patient>, StorageError> {
        let by_token = self.inner.records_by_token.pin();
        let Some(patient_id) = by_token.get(token) else {
            return Ok(None);
        };
        Ok(self.inner.patients.pin().get(patient_id).cloned())
    }

    async fn get_record(&self, patient_id: UserId) -> Result<Option<MedicalRecord>, StorageError> {
        Ok(self.inner.records.pin().get(&patient_id).cloned())
    }

    async fn get_record_by_id(&self, id: RecordId) -> Result<Option<MedicalRecord>, StorageError> {
        let by_id = self.inner.records_by_id.pin();
        let Some(patient_id) = by_id.get(&id) else {
            return Ok(None);
        };
        Ok(self.inner.records.pin().get(patient_id).cloned())
    }

    async fn deactivate_record(&self, patient_id: UserId) -> Result<(), StorageError> {
        let records = self.inner.records.pin();
        let updated = records.update(patient_id, |record| {
            let mut record = record.clone();
            record.active = false;
            record
        });
        if updated.is_none() {
            return Err(StorageError::not_found("MedicalRecord", patient_id));
        }
        Ok(())
    }

    async fn insert_token(&self, token: &str, principal: Principal) -> Result<(), StorageError> {
        self.inner.tokens.pin().insert(token.to_string(), principal);
        Ok(())
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, StorageError> {
        Ok(self.inner.tokens.pin().get(token).copied())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
