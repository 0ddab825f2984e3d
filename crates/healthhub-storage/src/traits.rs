//! Storage traits for the HealthHub storage abstraction layer.

use async_trait::async_trait;
use healthhub_core::{
    ActivityId, CareActivity, Consultation, ConsultationId, ExamId, ExamKind, Examen,
    HealthMetric, Hospital, HospitalId, LabResult, LabResultId, Medication, MedicationForm,
    MedicalRecord, Ordonnance, OrdonnanceId, OrdonnanceLine, Patient, Principal,
    RadiologyResult, RecordId, RoleProfile, User, UserId, WorkflowStatus,
};

use crate::error::StorageError;
use crate::types::ExamFilter;

/// Registry-side storage: hospitals, accounts, patients and their dossiers,
/// plus the bearer-token table that stands in for the external auth
/// collaborator.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RegistryStorage: Send + Sync {
    // ==================== Hospitals ====================

    async fn insert_hospital(&self, hospital: &Hospital) -> Result<(), StorageError>;

    async fn get_hospital(&self, id: HospitalId) -> Result<Option<Hospital>, StorageError>;

    // ==================== Users and profiles ====================

    /// Persists a user account together with its role profile. The pair is
    /// produced by `Principal::create`; storing one without the other is not
    /// possible through this interface.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the user id is taken.
    async fn insert_principal(&self, user: &User, profile: &RoleProfile)
    -> Result<(), StorageError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    async fn get_profile(&self, id: UserId) -> Result<Option<RoleProfile>, StorageError>;

    // ==================== Patients and dossiers ====================

    /// Persists a patient together with their medical record, atomically.
    /// A patient without a dossier never exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the national health id or
    /// the patient id is already registered.
    async fn insert_patient(
        &self,
        patient: &Patient,
        record: &MedicalRecord,
    ) -> Result<(), StorageError>;

    async fn get_patient(&self, id: UserId) -> Result<Option<Patient>, StorageError>;

    async fn find_patient_by_national_id(
        &self,
        national_health_id: i64,
    ) -> Result<Option<Patient>, StorageError>;

    async fn find_patient_by_qr_token(&self, token: &str)
    -> Result<Option<Patient>, StorageError>;

    async fn get_record(&self, patient_id: UserId) -> Result<Option<MedicalRecord>, StorageError>;

    async fn get_record_by_id(&self, id: RecordId) -> Result<Option<MedicalRecord>, StorageError>;

    /// Marks the dossier inactive. Records are never deleted.
    async fn deactivate_record(&self, patient_id: UserId) -> Result<(), StorageError>;

    // ==================== Bearer tokens ====================

    async fn insert_token(&self, token: &str, principal: Principal) -> Result<(), StorageError>;

    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Clinical-side storage: consultations, exams, prescriptions, results,
/// metrics and care activities.
#[async_trait]
pub trait ClinicalStorage: Send + Sync {
    // ==================== Consultations ====================

    async fn get_consultation(
        &self,
        id: ConsultationId,
    ) -> Result<Option<Consultation>, StorageError>;

    async fn consultations_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Vec<Consultation>, StorageError>;

    // ==================== Exams ====================

    async fn get_exam(&self, id: ExamId) -> Result<Option<Examen>, StorageError>;

    async fn put_exam(&self, exam: &Examen) -> Result<(), StorageError>;

    async fn exams_for_consultation(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Examen>, StorageError>;

    /// Work queue for a hospital wing: exams of the given kind whose owning
    /// patient belongs to `hospital_id`, narrowed by `filter`. Ordered by
    /// descending priority, then creation time.
    async fn exams_for_hospital(
        &self,
        kind: ExamKind,
        hospital_id: HospitalId,
        filter: &ExamFilter,
    ) -> Result<Vec<Examen>, StorageError>;

    // ==================== Results ====================

    async fn insert_lab_result(&self, result: &LabResult) -> Result<(), StorageError>;

    async fn get_lab_result(&self, id: LabResultId) -> Result<Option<LabResult>, StorageError>;

    async fn put_lab_result(&self, result: &LabResult) -> Result<(), StorageError>;

    async fn lab_results_for_exam(&self, exam_id: ExamId)
    -> Result<Vec<LabResult>, StorageError>;

    async fn insert_radiology_result(&self, result: &RadiologyResult)
    -> Result<(), StorageError>;

    async fn radiology_results_for_exam(
        &self,
        exam_id: ExamId,
    ) -> Result<Vec<RadiologyResult>, StorageError>;

    // ==================== Prescriptions ====================

    async fn get_ordonnance(&self, id: OrdonnanceId) -> Result<Option<Ordonnance>, StorageError>;

    async fn ordonnances_for_consultation(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Ordonnance>, StorageError>;

    async fn list_unvalidated_ordonnances(&self) -> Result<Vec<Ordonnance>, StorageError>;

    /// Flips `validated` to true and returns the updated row. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the prescription does not exist.
    async fn mark_ordonnance_validated(
        &self,
        id: OrdonnanceId,
    ) -> Result<Ordonnance, StorageError>;

    async fn lines_for_ordonnance(
        &self,
        id: OrdonnanceId,
    ) -> Result<Vec<OrdonnanceLine>, StorageError>;

    async fn get_medication(
        &self,
        name: &str,
        form: MedicationForm,
    ) -> Result<Option<Medication>, StorageError>;

    // ==================== Metrics and care activities ====================

    async fn insert_metric(&self, metric: &HealthMetric) -> Result<(), StorageError>;

    async fn metrics_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Vec<HealthMetric>, StorageError>;

    async fn insert_activity(&self, activity: &CareActivity) -> Result<(), StorageError>;

    async fn get_activity(&self, id: ActivityId) -> Result<Option<CareActivity>, StorageError>;

    async fn put_activity(&self, activity: &CareActivity) -> Result<(), StorageError>;

    async fn activities_for_nurse(
        &self,
        nurse_id: UserId,
    ) -> Result<Vec<CareActivity>, StorageError>;

    // ==================== Test counters ====================

    /// Atomically adds one to the technician's pending-test counter and
    /// returns the new value.
    async fn increment_pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError>;

    /// Atomically subtracts one from the technician's pending-test counter,
    /// saturating at zero, and returns the new value. A single storage-level
    /// operation: no read-modify-write at the caller.
    async fn decrement_pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError>;

    async fn pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError>;

    // ==================== Transactions ====================

    /// Begins a transaction covering consultation creation and its child
    /// rows. The transaction must be committed or rolled back explicitly.
    async fn begin_transaction(&self) -> Result<Box<dyn ClinicalTransaction>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A transaction over clinical rows.
///
/// Operations apply as they are issued; `rollback` undoes all of them in
/// reverse order. Either `commit` or `rollback` must be called; the set of
/// operations is exactly what consultation creation needs.
#[async_trait]
pub trait ClinicalTransaction: Send + Sync {
    async fn insert_consultation(&mut self, consultation: &Consultation)
    -> Result<(), StorageError>;

    async fn set_consultation_status(
        &mut self,
        id: ConsultationId,
        status: WorkflowStatus,
    ) -> Result<(), StorageError>;

    async fn insert_ordonnance(&mut self, ordonnance: &Ordonnance) -> Result<(), StorageError>;

    async fn insert_line(&mut self, line: &OrdonnanceLine) -> Result<(), StorageError>;

    /// Resolves a medication by (name, form), inserting a new catalog entry
    /// when none exists. Catalog inserts are part of the transaction and are
    /// undone on rollback.
    async fn resolve_or_insert_medication(
        &mut self,
        name: &str,
        form: MedicationForm,
        description: &str,
    ) -> Result<Medication, StorageError>;

    async fn insert_exam(&mut self, exam: &Examen) -> Result<(), StorageError>;

    /// Adds one to the assignee's pending-test counter; undone on rollback.
    async fn increment_pending_tests(&mut self, tech_id: UserId) -> Result<(), StorageError>;

    /// Commits all operations in this transaction.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Rolls back all operations in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}
