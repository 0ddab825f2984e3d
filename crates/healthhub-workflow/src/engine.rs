//! The workflow engine: consultation creation.
//!
//! Consultation creation is the one multi-row write in the system and
//! runs inside a storage transaction: the consultation, its prescription
//! or exams, catalog entries and counter bumps all commit together or
//! not at all.

use healthhub_core::{
    Consultation, ExamKind, Examen, Ordonnance, OrdonnanceId, OrdonnanceLine, Patient, Principal,
    Role, WorkflowStatus,
};
use healthhub_storage::{ClinicalTransaction, DynClinicalStorage, DynRegistryStorage};
use serde::Serialize;
use time::OffsetDateTime;

use crate::drafts::{ConsultationDraft, ExamRequest, OrdonnanceDraft};
use crate::error::{Result, WorkflowError};

#[derive(Clone)]
pub struct WorkflowEngine {
    pub(crate) registry: DynRegistryStorage,
    pub(crate) clinical: DynClinicalStorage,
}

/// Everything a consultation creation produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationOutcome {
    pub consultation: Consultation,
    pub ordonnance: Option<Ordonnance>,
    pub lines: Vec<OrdonnanceLine>,
    pub exams: Vec<Examen>,
}

impl WorkflowEngine {
    pub fn new(registry: DynRegistryStorage, clinical: DynClinicalStorage) -> Self {
        Self { registry, clinical }
    }

    /// Creates a consultation for `patient`, with either a prescription
    /// (diagnostic present) or complementary exams (diagnostic absent).
    /// One call never produces both.
    pub async fn create_consultation(
        &self,
        doctor: Principal,
        patient: &Patient,
        draft: ConsultationDraft,
    ) -> Result<ConsultationOutcome> {
        if doctor.role != Role::Doctor {
            return Err(WorkflowError::forbidden(
                "only doctors create consultations",
            ));
        }

        let record = self
            .registry
            .get_record(patient.user_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("MedicalRecord", patient.user_id))?;
        if !record.active {
            return Err(WorkflowError::conflict("dossier is deactivated"));
        }

        let mut tx = self.clinical.begin_transaction().await?;
        match self.apply_consultation(&mut tx, record.id, patient, &draft).await {
            Ok(outcome) => {
                tx.commit().await?;
                tracing::info!(
                    consultation_id = %outcome.consultation.id,
                    doctor_id = %doctor.user_id,
                    patient_id = %patient.user_id,
                    exams = outcome.exams.len(),
                    prescribed = outcome.ordonnance.is_some(),
                    "consultation created"
                );
                Ok(outcome)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    async fn apply_consultation(
        &self,
        tx: &mut Box<dyn ClinicalTransaction>,
        record_id: healthhub_core::RecordId,
        patient: &Patient,
        draft: &ConsultationDraft,
    ) -> Result<ConsultationOutcome> {
        let mut consultation = Consultation::open(record_id, draft.date, draft.summary.clone());
        consultation.diagnostic = draft.diagnostic().map(str::to_string);
        tx.insert_consultation(&consultation).await?;

        let mut outcome = ConsultationOutcome {
            consultation,
            ordonnance: None,
            lines: Vec::new(),
            exams: Vec::new(),
        };

        if outcome.consultation.diagnostic.is_some() {
            if !draft.exams.is_empty() {
                return Err(WorkflowError::validation(
                    "a consultation carries a prescription or exam requests, not both",
                ));
            }
            let prescription = draft.prescription.as_ref().ok_or_else(|| {
                WorkflowError::validation("a diagnostic requires a prescription draft")
            })?;
            let (ordonnance, lines) = self
                .apply_prescription(tx, outcome.consultation.id, prescription)
                .await?;
            outcome.ordonnance = Some(ordonnance);
            outcome.lines = lines;
        } else {
            if draft.prescription.is_some() {
                return Err(WorkflowError::validation(
                    "a prescription requires a diagnostic",
                ));
            }
            if draft.exams.is_empty() {
                return Err(WorkflowError::validation(
                    "a consultation without a diagnostic needs at least one exam request",
                ));
            }
            for request in &draft.exams {
                let exam = self
                    .apply_exam_request(tx, outcome.consultation.id, patient, request)
                    .await?;
                outcome.exams.push(exam);
            }
        }

        tx.set_consultation_status(outcome.consultation.id, WorkflowStatus::Completed)
            .await?;
        outcome.consultation.status = WorkflowStatus::Completed;
        Ok(outcome)
    }

    async fn apply_prescription(
        &self,
        tx: &mut Box<dyn ClinicalTransaction>,
        consultation_id: healthhub_core::ConsultationId,
        draft: &OrdonnanceDraft,
    ) -> Result<(Ordonnance, Vec<OrdonnanceLine>)> {
        let expires_at = draft
            .expires_at
            .ok_or_else(|| WorkflowError::validation("prescription expiration date is required"))?;
        if draft.lines.is_empty() {
            return Err(WorkflowError::validation(
                "a prescription needs at least one line",
            ));
        }

        let ordonnance = Ordonnance {
            id: OrdonnanceId::new(),
            consultation_id,
            validated: false,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        };
        tx.insert_ordonnance(&ordonnance).await?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let missing = |field: &str| {
                WorkflowError::validation(format!(
                    "{field} is required on the line for {}",
                    line.medication_name
                ))
            };
            let dose = line.dose.ok_or_else(|| missing("dose"))?;
            let duration = line.duration.clone().ok_or_else(|| missing("duration"))?;
            let frequency = line.frequency.clone().ok_or_else(|| missing("frequency"))?;

            let medication = tx
                .resolve_or_insert_medication(
                    &line.medication_name,
                    line.medication_form,
                    &line.medication_description,
                )
                .await?;
            let line = OrdonnanceLine {
                ordonnance_id: ordonnance.id,
                medication_id: medication.id,
                dose,
                duration,
                frequency,
                instructions: line.instructions.clone(),
            };
            tx.insert_line(&line).await?;
            lines.push(line);
        }
        Ok((ordonnance, lines))
    }

    async fn apply_exam_request(
        &self,
        tx: &mut Box<dyn ClinicalTransaction>,
        consultation_id: healthhub_core::ConsultationId,
        patient: &Patient,
        request: &ExamRequest,
    ) -> Result<Examen> {
        let assignee = self
            .registry
            .get_user(request.assignee)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", request.assignee))?;

        let wanted = match request.kind {
            ExamKind::Lab => Role::LabTech,
            ExamKind::Radiology => Role::Radiologist,
        };
        if assignee.role != wanted {
            return Err(WorkflowError::validation(format!(
                "{} exam must be assigned to a {wanted}, got {}",
                request.kind, assignee.role
            )));
        }
        if assignee.hospital_id != patient.hospital_id {
            return Err(WorkflowError::validation(
                "exam assignee must belong to the patient's hospital",
            ));
        }

        let exam = Examen::scheduled(
            consultation_id,
            request.kind,
            request.priority,
            request.notes.clone(),
            assignee.id,
        );
        tx.insert_exam(&exam).await?;
        tx.increment_pending_tests(assignee.id).await?;
        Ok(exam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::LineDraft;
    use crate::testing::{self, Fixture};
    use healthhub_core::{Dose, MedicationForm, Priority};
    use healthhub_storage::ClinicalStorage;
    use time::Duration;

    fn prescription_draft() -> ConsultationDraft {
        ConsultationDraft {
            date: OffsetDateTime::now_utc(),
            summary: "angine".into(),
            diagnostic: Some("angine bacterienne".into()),
            prescription: Some(OrdonnanceDraft {
                expires_at: Some(OffsetDateTime::now_utc() + Duration::days(90)),
                lines: vec![LineDraft {
                    medication_name: "amoxicilline".into(),
                    medication_form: MedicationForm::Tablet,
                    medication_description: "antibiotic".into(),
                    dose: Some(Dose::Medium),
                    duration: Some("7 days".into()),
                    frequency: Some("3x daily".into()),
                    instructions: "after meals".into(),
                }],
            }),
            exams: Vec::new(),
        }
    }

    fn exam_draft(fix: &Fixture) -> ConsultationDraft {
        ConsultationDraft {
            date: OffsetDateTime::now_utc(),
            summary: "bilan".into(),
            diagnostic: None,
            prescription: None,
            exams: vec![ExamRequest {
                kind: ExamKind::Lab,
                priority: Priority::Urgent,
                notes: "NFS".into(),
                assignee: fix.lab_tech.id,
            }],
        }
    }

    #[tokio::test]
    async fn diagnostic_path_creates_one_prescription() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let draft = prescription_draft();

        let outcome = engine
            .create_consultation(fix.doctor.principal(), &fix.patient, draft)
            .await
            .unwrap();
        assert_eq!(outcome.consultation.status, WorkflowStatus::Completed);
        let ordonnance = outcome.ordonnance.unwrap();
        assert!(!ordonnance.validated);
        assert_eq!(outcome.lines.len(), 1);
        assert!(outcome.exams.is_empty());

        // catalog entry was created inside the same transaction
        let medication = fix
            .clinical()
            .get_medication("amoxicilline", MedicationForm::Tablet)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.lines[0].medication_id, medication.id);
    }

    #[tokio::test]
    async fn exam_path_schedules_and_counts() {
        let fix = testing::fixture().await;
        let engine = fix.engine();

        let outcome = engine
            .create_consultation(fix.doctor.principal(), &fix.patient, exam_draft(&fix))
            .await
            .unwrap();
        assert_eq!(outcome.exams.len(), 1);
        assert_eq!(outcome.exams[0].status, WorkflowStatus::Scheduled);
        assert_eq!(outcome.exams[0].assignee(), Some(fix.lab_tech.id));
        assert_eq!(
            fix.clinical().pending_tests(fix.lab_tech.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn missing_dose_rolls_back_everything() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let mut draft = prescription_draft();
        draft.prescription.as_mut().unwrap().lines[0].dose = None;

        let err = engine
            .create_consultation(fix.doctor.principal(), &fix.patient, draft)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));

        // no orphaned consultation, no catalog entry
        let record = fix.record.id;
        assert!(fix
            .clinical()
            .consultations_for_record(record)
            .await
            .unwrap()
            .is_empty());
        assert!(fix
            .clinical()
            .get_medication("amoxicilline", MedicationForm::Tablet)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn wrong_specialty_assignee_is_rejected() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let mut draft = exam_draft(&fix);
        draft.exams[0].assignee = fix.radiologist.id;

        let err = engine
            .create_consultation(fix.doctor.principal(), &fix.patient, draft)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));
        assert_eq!(
            fix.clinical()
                .pending_tests(fix.radiologist.id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn non_doctor_is_forbidden() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let err = engine
            .create_consultation(fix.nurse.principal(), &fix.patient, exam_draft(&fix))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn both_paths_at_once_are_rejected() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let mut draft = prescription_draft();
        draft.exams = exam_draft(&fix).exams;

        let err = engine
            .create_consultation(fix.doctor.principal(), &fix.patient, draft)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));
    }
}
