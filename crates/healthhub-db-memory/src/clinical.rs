use async_trait::async_trait;
use healthhub_core::{
    ActivityId, CareActivity, Consultation, ConsultationId, ExamId, ExamKind, Examen,
    HealthMetric, HospitalId, LabResult, LabResultId, Medication, MedicationForm, Ordonnance,
    OrdonnanceId, OrdonnanceLine, RadiologyResult, RecordId, UserId,
};
use healthhub_storage::{ClinicalStorage, ClinicalTransaction, ExamFilter, StorageError};

use crate::storage::InMemoryStorage;
use crate::transaction::MemoryTransaction;

#[async_trait]
impl ClinicalStorage for InMemoryStorage {
    async fn get_consultation(
        &self,
        id: ConsultationId,
    ) -> Result<Option<Consultation>, StorageError> {
        Ok(self.inner.consultations.pin().get(&id).cloned())
    }

    async fn consultations_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Vec<Consultation>, StorageError> {
        let guard = self.inner.consultations.pin();
        let mut out: Vec<Consultation> = guard
            .iter()
            .filter(|(_, c)| c.record_id == record_id)
            .map(|(_, c)| c.clone())
            .collect();
        out.sort_by_key(|c| c.date);
        Ok(out)
    }

    async fn get_exam(&self, id: ExamId) -> Result<Option<Examen>, StorageError> {
        Ok(self.inner.exams.pin().get(&id).cloned())
    }

    async fn put_exam(&self, exam: &Examen) -> Result<(), StorageError> {
        self.inner.exams.pin().insert(exam.id, exam.clone());
        Ok(())
    }

    async fn exams_for_consultation(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Examen>, StorageError> {
        let guard = self.inner.exams.pin();
        let mut out: Vec<Examen> = guard
            .iter()
            .filter(|(_, e)| e.consultation_id == consultation_id)
            .map(|(_, e)| e.clone())
            .collect();
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }

    async fn exams_for_hospital(
        &self,
        kind: ExamKind,
        hospital_id: HospitalId,
        filter: &ExamFilter,
    ) -> Result<Vec<Examen>, StorageError> {
        let guard = self.inner.exams.pin();
        let mut out: Vec<Examen> = guard
            .iter()
            .filter(|(_, e)| e.kind == kind && filter.matches(e.status, e.priority))
            .filter(|(_, e)| self.hospital_of_exam(e) == Some(hospital_id))
            .map(|(_, e)| e.clone())
            .collect();
        // most urgent first, oldest first within a priority
        out.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(out)
    }

    async fn insert_lab_result(&self, result: &LabResult) -> Result<(), StorageError> {
        let guard = self.inner.lab_results.pin();
        if guard.get(&result.id).is_some() {
            return Err(StorageError::already_exists("LabResult", result.id));
        }
        guard.insert(result.id, result.clone());
        Ok(())
    }

    async fn get_lab_result(&self, id: LabResultId) -> Result<Option<LabResult>, StorageError> {
        Ok(self.inner.lab_results.pin().get(&id).cloned())
    }

    async fn put_lab_result(&self, result: &LabResult) -> Result<(), StorageError> {
        self.inner
            .lab_results
            .pin()
            .insert(result.id, result.clone());
        Ok(())
    }

    async fn lab_results_for_exam(
        &self,
        exam_id: ExamId,
    ) -> Result<Vec<LabResult>, StorageError> {
        let guard = self.inner.lab_results.pin();
        let mut out: Vec<LabResult> = guard
            .iter()
            .filter(|(_, r)| r.exam_id == exam_id)
            .map(|(_, r)| r.clone())
            .collect();
        out.sort_by_key(|r| r.analyzed_at);
        Ok(out)
    }

    async fn insert_radiology_result(
        &self,
        result: &RadiologyResult,
    ) -> Result<(), StorageError> {
        let guard = self.inner.radiology_results.pin();
        if guard.get(&result.id).is_some() {
            return Err(StorageError::already_exists("RadiologyResult", result.id));
        }
        guard.insert(result.id, result.clone());
        Ok(())
    }

    async fn radiology_results_for_exam(
        &self,
        exam_id: ExamId,
    ) -> Result<Vec<RadiologyResult>, StorageError> {
        let guard = self.inner.radiology_results.pin();
        let mut out: Vec<RadiologyResult> = guard
            .iter()
            .filter(|(_, r)| r.exam_id == exam_id)
            .map(|(_, r)| r.clone())
            .collect();
        out.sort_by_key(|r| r.performed_at);
        Ok(out)
    }

    async fn get_ordonnance(&self, id: OrdonnanceId) -> Result<Option<Ordonnance>, StorageError> {
        Ok(self.inner.ordonnances.pin().get(&id).cloned())
    }

    async fn ordonnances_for_consultation(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Ordonnance>, StorageError> {
        let guard = self.inner.ordonnances.pin();
        let mut out: Vec<Ordonnance> = guard
            .iter()
            .filter(|(_, o)| o.consultation_id == consultation_id)
            .map(|(_, o)| o.clone())
            .collect();
        out.sort_by_key(|o| o.created_at);
        Ok(out)
    }

    async fn list_unvalidated_ordonnances(&self) -> Result<Vec<Ordonnance>, StorageError> {
        let guard = self.inner.ordonnances.pin();
        let mut out: Vec<Ordonnance> = guard
            .iter()
            .filter(|(_, o)| !o.validated)
            .map(|(_, o)| o.clone())
            .collect();
        out.sort_by_key(|o| o.created_at);
        Ok(out)
    }

    async fn mark_ordonnance_validated(
        &self,
        id: OrdonnanceId,
    ) -> Result<Ordonnance, StorageError> {
        let guard = self.inner.ordonnances.pin();
        let updated = guard.update(id, |o| {
            let mut o = o.clone();
            o.validated = true;
            o
        });
        updated
            .cloned()
            .ok_or_else(|| StorageError::not_found("Ordonnance", id))
    }

    async fn lines_for_ordonnance(
        &self,
        id: OrdonnanceId,
    ) -> Result<Vec<OrdonnanceLine>, StorageError> {
        Ok(self.inner.lines.pin().get(&id).cloned().unwrap_or_default())
    }

    async fn get_medication(
        &self,
        name: &str,
        form: MedicationForm,
    ) -> Result<Option<Medication>, StorageError> {
        let index = self.inner.medication_index.pin();
        let Some(id) = index.get(&(name.to_string(), form)) else {
            return Ok(None);
        };
        Ok(self.inner.medications.pin().get(id).cloned())
    }

    async fn insert_metric(&self, metric: &HealthMetric) -> Result<(), StorageError> {
        self.inner.metrics.pin().insert(metric.id, metric.clone());
        Ok(())
    }

    async fn metrics_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Vec<HealthMetric>, StorageError> {
        let guard = self.inner.metrics.pin();
        let mut out: Vec<HealthMetric> = guard
            .iter()
            .filter(|(_, m)| m.record_id == record_id)
            .map(|(_, m)| m.clone())
            .collect();
        out.sort_by_key(|m| m.measured_at);
        Ok(out)
    }

    async fn insert_activity(&self, activity: &CareActivity) -> Result<(), StorageError> {
        let guard = self.inner.activities.pin();
        if guard.get(&activity.id).is_some() {
            return Err(StorageError::already_exists("CareActivity", activity.id));
        }
        guard.insert(activity.id, activity.clone());
        Ok(())
    }

    async fn get_activity(&self, id: ActivityId) -> Result<Option<CareActivity>, StorageError> {
        Ok(self.inner.activities.pin().get(&id).cloned())
    }

    async fn put_activity(&self, activity: &CareActivity) -> Result<(), StorageError> {
        self.inner
            .activities
            .pin()
            .insert(activity.id, activity.clone());
        Ok(())
    }

    async fn activities_for_nurse(
        &self,
        nurse_id: UserId,
    ) -> Result<Vec<CareActivity>, StorageError> {
        let guard = self.inner.activities.pin();
        let mut out: Vec<CareActivity> = guard
            .iter()
            .filter(|(_, a)| a.nurse_id == nurse_id)
            .map(|(_, a)| a.clone())
            .collect();
        out.sort_by_key(|a| a.created_at);
        Ok(out)
    }

    async fn increment_pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError> {
        let guard = self.inner.counters.pin();
        let value = guard.update_or_insert(tech_id, |c| c + 1, 1);
        Ok(*value)
    }

    async fn decrement_pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError> {
        // single atomic saturating decrement; never drops below zero even
        // under concurrent submissions
        let guard = self.inner.counters.pin();
        let value = guard.update_or_insert(tech_id, |c| c.saturating_sub(1), 0);
        Ok(*value)
    }

    async fn pending_tests(&self, tech_id: UserId) -> Result<u32, StorageError> {
        Ok(self.inner.counters.pin().get(&tech_id).copied().unwrap_or(0))
    }

    async fn begin_transaction(&self) -> Result<Box<dyn ClinicalTransaction>, StorageError> {
        Ok(Box::new(MemoryTransaction::new(self.clone())))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
