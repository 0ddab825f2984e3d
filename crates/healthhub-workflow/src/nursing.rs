//! Nurse care activities and health metrics.
//!
//! Doctors plan activities for nurses on a consultation; the assigned
//! nurse moves them forward and records observations. Lab technicians
//! attach metrics to their own results.

use healthhub_core::{
    ActivityId, ActivityKind, ActivityStatus, CareActivity, ConsultationId, HealthMetric,
    LabResultId, MetricId, Principal, Role, UserId,
};
use time::OffsetDateTime;

use crate::drafts::MetricDraft;
use crate::engine::WorkflowEngine;
use crate::error::{Result, WorkflowError};

impl WorkflowEngine {
    /// Plans a care activity for `nurse_id` on an existing consultation.
    pub async fn plan_activity(
        &self,
        doctor: Principal,
        consultation_id: ConsultationId,
        nurse_id: UserId,
        activity: ActivityKind,
        doctor_details: impl Into<String>,
    ) -> Result<CareActivity> {
        if doctor.role != Role::Doctor {
            return Err(WorkflowError::forbidden("only doctors plan care activities"));
        }
        self.clinical
            .get_consultation(consultation_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Consultation", consultation_id))?;
        let nurse = self
            .registry
            .get_user(nurse_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", nurse_id))?;
        if nurse.role != Role::Nurse {
            return Err(WorkflowError::validation(format!(
                "care activities are assigned to nurses, got {}",
                nurse.role
            )));
        }

        let planned = CareActivity::planned(consultation_id, nurse_id, activity, doctor_details);
        self.clinical.insert_activity(&planned).await?;
        tracing::info!(
            activity_id = %planned.id,
            nurse_id = %nurse_id,
            "care activity planned"
        );
        Ok(planned)
    }

    async fn owned_activity(&self, nurse: Principal, id: ActivityId) -> Result<CareActivity> {
        let activity = self
            .clinical
            .get_activity(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("CareActivity", id))?;
        if activity.nurse_id != nurse.user_id {
            return Err(WorkflowError::forbidden(
                "care activities are limited to the assigned nurse",
            ));
        }
        Ok(activity)
    }

    /// `Planifie -> EnCours`. Re-entrant.
    pub async fn start_activity(&self, nurse: Principal, id: ActivityId) -> Result<CareActivity> {
        let mut activity = self.owned_activity(nurse, id).await?;
        match activity.status {
            ActivityStatus::InProgress => return Ok(activity),
            ActivityStatus::Scheduled => {
                activity.status = ActivityStatus::InProgress;
                self.clinical.put_activity(&activity).await?;
                Ok(activity)
            }
            ActivityStatus::Completed => Err(WorkflowError::IllegalTransition {
                entity: "CareActivity",
                from: activity.status.as_str().to_string(),
                to: ActivityStatus::InProgress.as_str().to_string(),
            }),
        }
    }

    /// `EnCours -> Termine`, recording the nurse's observations.
    pub async fn complete_activity(
        &self,
        nurse: Principal,
        id: ActivityId,
        observations: impl Into<String>,
    ) -> Result<CareActivity> {
        let mut activity = self.owned_activity(nurse, id).await?;
        if activity.status != ActivityStatus::InProgress {
            return Err(WorkflowError::IllegalTransition {
                entity: "CareActivity",
                from: activity.status.as_str().to_string(),
                to: ActivityStatus::Completed.as_str().to_string(),
            });
        }
        activity.status = ActivityStatus::Completed;
        activity.nurse_observations = observations.into();
        self.clinical.put_activity(&activity).await?;
        tracing::info!(activity_id = %activity.id, "care activity completed");
        Ok(activity)
    }

    pub async fn activities_for(&self, nurse: Principal) -> Result<Vec<CareActivity>> {
        Ok(self.clinical.activities_for_nurse(nurse.user_id).await?)
    }

    /// Attaches a measurement to one of the technician's own lab results.
    pub async fn record_metric(
        &self,
        technician: Principal,
        lab_result_id: LabResultId,
        draft: MetricDraft,
    ) -> Result<HealthMetric> {
        let result = self
            .clinical
            .get_lab_result(lab_result_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("LabResult", lab_result_id))?;
        if result.technician_id != technician.user_id {
            return Err(WorkflowError::forbidden(
                "metrics may only be attached to your own results",
            ));
        }

        // walk up to the dossier the metric belongs to
        let exam = self
            .clinical
            .get_exam(result.exam_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Examen", result.exam_id))?;
        let consultation = self
            .clinical
            .get_consultation(exam.consultation_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Consultation", exam.consultation_id))?;

        let metric = HealthMetric {
            id: MetricId::new(),
            record_id: consultation.record_id,
            metric: draft.metric,
            value: draft.value,
            unit: draft.unit,
            measured_at: OffsetDateTime::now_utc(),
            recorded_by: technician.user_id,
            lab_result_id: Some(lab_result_id),
        };
        self.clinical.insert_metric(&metric).await?;
        Ok(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::{ConsultationDraft, ExamRequest, ExamResultDraft};
    use crate::exam::SubmittedResult;
    use crate::testing;
    use healthhub_core::{ExamKind, MetricKind, Priority};
    use healthhub_storage::ClinicalStorage;

    async fn consultation(fix: &testing::Fixture) -> ConsultationId {
        let draft = ConsultationDraft {
            date: OffsetDateTime::now_utc(),
            summary: "bilan".into(),
            diagnostic: None,
            prescription: None,
            exams: vec![ExamRequest {
                kind: ExamKind::Lab,
                priority: Priority::Normal,
                notes: "glycemie".into(),
                assignee: fix.lab_tech.id,
            }],
        };
        fix.engine()
            .create_consultation(fix.doctor.principal(), &fix.patient, draft)
            .await
            .unwrap()
            .consultation
            .id
    }

    #[tokio::test]
    async fn nurse_walks_the_activity_lifecycle() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let consultation_id = consultation(&fix).await;

        let planned = engine
            .plan_activity(
                fix.doctor.principal(),
                consultation_id,
                fix.nurse.id,
                ActivityKind::Observation,
                "surveiller la tension",
            )
            .await
            .unwrap();
        assert_eq!(planned.status, ActivityStatus::Scheduled);

        let started = engine
            .start_activity(fix.nurse.principal(), planned.id)
            .await
            .unwrap();
        assert_eq!(started.status, ActivityStatus::InProgress);

        let done = engine
            .complete_activity(fix.nurse.principal(), planned.id, "tension stable")
            .await
            .unwrap();
        assert_eq!(done.status, ActivityStatus::Completed);
        assert_eq!(done.nurse_observations, "tension stable");

        let mine = engine.activities_for(fix.nurse.principal()).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn completing_an_unstarted_activity_is_illegal() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let consultation_id = consultation(&fix).await;
        let planned = engine
            .plan_activity(
                fix.doctor.principal(),
                consultation_id,
                fix.nurse.id,
                ActivityKind::Care,
                "pansement",
            )
            .await
            .unwrap();

        let err = engine
            .complete_activity(fix.nurse.principal(), planned.id, "done")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn activities_cannot_be_assigned_to_non_nurses() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let consultation_id = consultation(&fix).await;

        let err = engine
            .plan_activity(
                fix.doctor.principal(),
                consultation_id,
                fix.lab_tech.id,
                ActivityKind::Sampling,
                "prelevement",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));
    }

    #[tokio::test]
    async fn metric_lands_on_the_right_dossier() {
        let fix = testing::fixture().await;
        let engine = fix.engine();
        let consultation_id = consultation(&fix).await;
        let exam = fix
            .clinical()
            .exams_for_consultation(consultation_id)
            .await
            .unwrap()
            .remove(0);
        let SubmittedResult::Lab(result) = engine
            .submit_result(
                fix.lab_tech.principal(),
                exam.id,
                ExamResultDraft::Lab {
                    report: "glycemie 1.1 g/L".into(),
                },
            )
            .await
            .unwrap()
        else {
            panic!("expected a lab result");
        };

        let metric = engine
            .record_metric(
                fix.lab_tech.principal(),
                result.id,
                MetricDraft {
                    metric: MetricKind::Glycemia,
                    value: 1.1,
                    unit: "g/L".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(metric.record_id, fix.record.id);
        assert_eq!(metric.lab_result_id, Some(result.id));

        // someone else's result is off limits
        let err = engine
            .record_metric(
                fix.radiologist.principal(),
                result.id,
                MetricDraft {
                    metric: MetricKind::Other,
                    value: 0.0,
                    unit: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden { .. }));
    }
}
