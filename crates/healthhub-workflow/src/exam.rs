//! Exam lifecycle: start, submit a result, validate, cancel.

use healthhub_core::{
    ExamId, ExamKind, Examen, LabResult, LabResultId, Principal, RadiologyResult,
    RadiologyResultId, WorkflowStatus,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::drafts::ExamResultDraft;
use crate::engine::WorkflowEngine;
use crate::error::{Result, WorkflowError};

/// The persisted result of a submission, shaped by the exam's kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmittedResult {
    Lab(LabResult),
    Radiology(RadiologyResult),
}

impl WorkflowEngine {
    async fn owned_exam(&self, principal: Principal, id: ExamId) -> Result<Examen> {
        let exam = self
            .clinical
            .get_exam(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Examen", id))?;
        if exam.assignee() != Some(principal.user_id) {
            return Err(WorkflowError::forbidden(
                "exam actions are limited to the assignee",
            ));
        }
        Ok(exam)
    }

    /// `Planifie -> EnCours`. Re-entrant: starting an exam that is already
    /// in progress is a no-op.
    pub async fn start_exam(&self, principal: Principal, id: ExamId) -> Result<Examen> {
        let mut exam = self.owned_exam(principal, id).await?;
        if exam.status == WorkflowStatus::InProgress {
            return Ok(exam);
        }
        exam.status = exam
            .status
            .transition("Examen", WorkflowStatus::InProgress)?;
        self.clinical.put_exam(&exam).await?;
        tracing::info!(exam_id = %exam.id, "exam started");
        Ok(exam)
    }

    /// Persists the result, completes the exam and releases the assignee's
    /// pending-test slot.
    pub async fn submit_result(
        &self,
        principal: Principal,
        id: ExamId,
        draft: ExamResultDraft,
    ) -> Result<SubmittedResult> {
        let mut exam = self.owned_exam(principal, id).await?;
        if exam.status.is_terminal() {
            return Err(WorkflowError::conflict(format!(
                "exam is {} and no longer accepts results",
                exam.status
            )));
        }
        if draft.kind() != exam.kind {
            return Err(WorkflowError::validation(format!(
                "a {} result cannot be attached to a {} exam",
                draft.kind(),
                exam.kind
            )));
        }

        let submitted = match draft {
            ExamResultDraft::Lab { report } => {
                let result = LabResult {
                    id: LabResultId::new(),
                    exam_id: exam.id,
                    technician_id: principal.user_id,
                    report,
                    analyzed_at: OffsetDateTime::now_utc(),
                    validated: false,
                };
                self.clinical.insert_lab_result(&result).await?;
                SubmittedResult::Lab(result)
            }
            ExamResultDraft::Radiology {
                modality,
                report,
                image_url,
            } => {
                let result = RadiologyResult {
                    id: RadiologyResultId::new(),
                    exam_id: exam.id,
                    radiologist_id: principal.user_id,
                    image_url,
                    modality,
                    report,
                    performed_at: OffsetDateTime::now_utc(),
                };
                self.clinical.insert_radiology_result(&result).await?;
                SubmittedResult::Radiology(result)
            }
        };

        exam.status = exam.status.transition("Examen", WorkflowStatus::Completed)?;
        self.clinical.put_exam(&exam).await?;
        let remaining = self
            .clinical
            .decrement_pending_tests(principal.user_id)
            .await?;
        tracing::info!(
            exam_id = %exam.id,
            technician_id = %principal.user_id,
            pending_tests = remaining,
            "result submitted"
        );
        Ok(submitted)
    }

    /// Terminal confirmation of a completed exam. Requires a result;
    /// idempotent.
    pub async fn validate_exam(&self, principal: Principal, id: ExamId) -> Result<Examen> {
        let mut exam = self.owned_exam(principal, id).await?;

        let has_result = match exam.kind {
            ExamKind::Lab => !self.clinical.lab_results_for_exam(id).await?.is_empty(),
            ExamKind::Radiology => !self
                .clinical
                .radiology_results_for_exam(id)
                .await?
                .is_empty(),
        };
        if !has_result {
            return Err(WorkflowError::conflict("exam has no result to validate"));
        }

        if exam.status != WorkflowStatus::Completed {
            exam.status = exam.status.transition("Examen", WorkflowStatus::Completed)?;
            self.clinical.put_exam(&exam).await?;
        }

        if exam.kind == ExamKind::Lab {
            let results = self.clinical.lab_results_for_exam(id).await?;
            if let Some(latest) = results.into_iter().next_back()
                && !latest.validated
            {
                let mut latest = latest;
                latest.validated = true;
                self.clinical.put_lab_result(&latest).await?;
            }
        }
        Ok(exam)
    }

    /// `Planifie`/`EnCours -> Annule`. Terminal exams reject. Cancellation
    /// releases the assignee's pending-test slot.
    pub async fn cancel_exam(&self, principal: Principal, id: ExamId) -> Result<Examen> {
        let mut exam = self.owned_exam(principal, id).await?;
        exam.status = exam.status.transition("Examen", WorkflowStatus::Cancelled)?;
        self.clinical.put_exam(&exam).await?;
        self.clinical
            .decrement_pending_tests(principal.user_id)
            .await?;
        tracing::info!(exam_id = %exam.id, "exam cancelled");
        Ok(exam)
    }
}
