use healthhub_core::{
    ActivityId, CareActivity, Consultation, ConsultationId, ExamId, Examen, HealthMetric,
    Hospital, HospitalId, LabResult, LabResultId, MedicalRecord, Medication, MedicationForm,
    MedicationId, MetricId, Ordonnance, OrdonnanceId, OrdonnanceLine, Patient, Principal,
    RadiologyResult, RadiologyResultId, RecordId, RoleProfile, User, UserId,
};
use papaya::HashMap as PapayaHashMap;
use std::sync::Arc;

/// In-memory HealthHub storage backend using papaya lock-free maps.
///
/// Cloning is cheap: all maps live behind one `Arc`, so the same instance
/// can serve as both `RegistryStorage` and `ClinicalStorage`, and
/// transactions hold a handle to the shared state for rollback.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    pub(crate) inner: Arc<Maps>,
}

#[derive(Debug, Default)]
pub(crate) struct Maps {
    // Registry side
    pub(crate) hospitals: PapayaHashMap<HospitalId, Hospital>,
    pub(crate) users: PapayaHashMap<UserId, User>,
    pub(crate) profiles: PapayaHashMap<UserId, RoleProfile>,
    pub(crate) patients: PapayaHashMap<UserId, Patient>,
    /// national_health_id -> patient id
    pub(crate) patients_by_nid: PapayaHashMap<i64, UserId>,
    /// patient id -> dossier
    pub(crate) records: PapayaHashMap<UserId, MedicalRecord>,
    /// dossier id -> patient id
    pub(crate) records_by_id: PapayaHashMap<RecordId, UserId>,
    /// qr token -> patient id
    pub(crate) records_by_token: PapayaHashMap<String, UserId>,
    /// opaque bearer token -> principal
    pub(crate) tokens: PapayaHashMap<String, Principal>,

    // Clinical side
    pub(crate) consultations: PapayaHashMap<ConsultationId, Consultation>,
    pub(crate) exams: PapayaHashMap<ExamId, Examen>,
    pub(crate) ordonnances: PapayaHashMap<OrdonnanceId, Ordonnance>,
    pub(crate) lines: PapayaHashMap<OrdonnanceId, Vec<OrdonnanceLine>>,
    pub(crate) medications: PapayaHashMap<MedicationId, Medication>,
    /// (name, form) -> catalog id, mirroring the catalog's uniqueness rule
    pub(crate) medication_index: PapayaHashMap<(String, MedicationForm), MedicationId>,
    pub(crate) lab_results: PapayaHashMap<LabResultId, LabResult>,
    pub(crate) radiology_results: PapayaHashMap<RadiologyResultId, RadiologyResult>,
    pub(crate) metrics: PapayaHashMap<MetricId, HealthMetric>,
    pub(crate) activities: PapayaHashMap<ActivityId, CareActivity>,
    /// pending-test counters, updated only through the map's atomic update
    pub(crate) counters: PapayaHashMap<UserId, u32>,
}

impl InMemoryStorage {
    /// Creates a new, empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the hospital an exam's patient belongs to by walking
    /// exam -> consultation -> record -> patient.
    pub(crate) fn hospital_of_exam(&self, exam: &Examen) -> Option<HospitalId> {
        let maps = &self.inner;
        let consultations = maps.consultations.pin();
        let consultation = consultations.get(&exam.consultation_id)?;
        let records_by_id = maps.records_by_id.pin();
        let patient_id = records_by_id.get(&consultation.record_id)?;
        let patients = maps.patients.pin();
        patients.get(patient_id).map(|p| p.hospital_id)
    }
}
