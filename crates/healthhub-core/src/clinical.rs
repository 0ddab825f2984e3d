//! Clinical entities and their status state machines.
//!
//! Consultations and exams share one status vocabulary
//! (`planifie -> en_cours -> termine`, `annule` from any non-terminal
//! state). Transition legality is checked here; the workflow engine decides
//! when transitions happen.

use crate::error::CoreError;
use crate::id::{
    ActivityId, ConsultationId, ExamId, LabResultId, MedicationId, MetricId, OrdonnanceId,
    RadiologyResultId, RecordId, UserId,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle status of a consultation or exam.
///
/// Wire codes keep the registry's historical French vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    #[serde(rename = "planifie")]
    Scheduled,
    #[serde(rename = "en_cours")]
    InProgress,
    #[serde(rename = "termine")]
    Completed,
    #[serde(rename = "annule")]
    Cancelled,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "planifie",
            Self::InProgress => "en_cours",
            Self::Completed => "termine",
            Self::Cancelled => "annule",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a forward transition to `next` is legal. Statuses advance
    /// monotonically; cancellation is legal from any non-terminal state.
    /// Re-entering the current state is tolerated (re-entrant `start`).
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        match (self, next) {
            (Self::Scheduled, Self::InProgress | Self::Completed | Self::Cancelled) => true,
            (Self::InProgress, Self::InProgress | Self::Completed | Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Check a transition, producing the domain error on violation.
    pub fn transition(
        &self,
        entity: &'static str,
        next: WorkflowStatus,
    ) -> Result<WorkflowStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::illegal_transition(
                entity,
                self.as_str(),
                next.as_str(),
            ))
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub record_id: RecordId,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Present iff the consultation took the prescription path.
    pub diagnostic: Option<String>,
    pub summary: String,
    pub status: WorkflowStatus,
}

impl Consultation {
    /// New consultations open directly in progress: the doctor is in the
    /// room when the record is created.
    pub fn open(record_id: RecordId, date: OffsetDateTime, summary: impl Into<String>) -> Self {
        Self {
            id: ConsultationId::new(),
            record_id,
            date,
            diagnostic: None,
            summary: summary.into(),
            status: WorkflowStatus::InProgress,
        }
    }
}

/// Which wing of the hospital performs an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamKind {
    Lab,
    Radiology,
}

impl ExamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lab => "lab",
            Self::Radiology => "radiology",
        }
    }
}

impl std::fmt::Display for ExamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    VeryUrgent,
}

/// A prescribed complementary exam.
///
/// Exactly one assignee is set, matching `kind`; use [`Examen::assignee`]
/// rather than reading the fields directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Examen {
    pub id: ExamId,
    pub consultation_id: ConsultationId,
    pub kind: ExamKind,
    pub status: WorkflowStatus,
    pub priority: Priority,
    pub notes: String,
    pub assigned_lab_tech_id: Option<UserId>,
    pub assigned_radiologist_id: Option<UserId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Examen {
    /// Build a scheduled exam assigned to the given technician or
    /// radiologist, depending on `kind`.
    pub fn scheduled(
        consultation_id: ConsultationId,
        kind: ExamKind,
        priority: Priority,
        notes: impl Into<String>,
        assignee: UserId,
    ) -> Self {
        let (lab, radio) = match kind {
            ExamKind::Lab => (Some(assignee), None),
            ExamKind::Radiology => (None, Some(assignee)),
        };
        Self {
            id: ExamId::new(),
            consultation_id,
            kind,
            status: WorkflowStatus::Scheduled,
            priority,
            notes: notes.into(),
            assigned_lab_tech_id: lab,
            assigned_radiologist_id: radio,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// The technician or radiologist the exam is assigned to.
    pub fn assignee(&self) -> Option<UserId> {
        match self.kind {
            ExamKind::Lab => self.assigned_lab_tech_id,
            ExamKind::Radiology => self.assigned_radiologist_id,
        }
    }
}

/// A prescription. Starts unvalidated; the external pharmacy service flips
/// `validated` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordonnance {
    pub id: OrdonnanceId,
    pub consultation_id: ConsultationId,
    pub validated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Dose strength. Wire codes keep the registry's French vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dose {
    #[serde(rename = "faible")]
    Low,
    #[serde(rename = "moyen")]
    Medium,
    #[serde(rename = "fort")]
    High,
}

/// One medication line on a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdonnanceLine {
    pub ordonnance_id: OrdonnanceId,
    pub medication_id: MedicationId,
    pub dose: Dose,
    pub duration: String,
    pub frequency: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationForm {
    #[serde(rename = "comprime")]
    Tablet,
    #[serde(rename = "sirop")]
    Syrup,
    #[serde(rename = "injection")]
    Injection,
    #[serde(rename = "pommade")]
    Ointment,
    #[serde(rename = "autre")]
    Other,
}

/// Global medication catalog entry, unique on (name, form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub name: String,
    pub form: MedicationForm,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabResult {
    pub id: LabResultId,
    pub exam_id: ExamId,
    pub technician_id: UserId,
    pub report: String,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
    pub validated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiologyModality {
    #[serde(rename = "radiographie")]
    Radiography,
    #[serde(rename = "echographie")]
    Ultrasound,
    #[serde(rename = "scanner")]
    Scanner,
    #[serde(rename = "irm")]
    Mri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiologyResult {
    pub id: RadiologyResultId,
    pub exam_id: ExamId,
    pub radiologist_id: UserId,
    /// Durable URL from the image-hosting collaborator. Opaque to the core.
    pub image_url: Option<String>,
    pub modality: RadiologyModality,
    pub report: String,
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Temperature,
    BloodPressure,
    Glycemia,
    Other,
}

/// A measurement recorded against a dossier, optionally tied to the lab
/// result that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: MetricId,
    pub record_id: RecordId,
    pub metric: MetricKind,
    pub value: f64,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub measured_at: OffsetDateTime,
    pub recorded_by: UserId,
    pub lab_result_id: Option<LabResultId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    MedicationAdministration,
    Care,
    Observation,
    Sampling,
    Other,
}

/// Nurse care activity status. No cancellation path in the legacy model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[serde(rename = "planifie")]
    Scheduled,
    #[serde(rename = "en_cours")]
    InProgress,
    #[serde(rename = "termine")]
    Completed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "planifie",
            Self::InProgress => "en_cours",
            Self::Completed => "termine",
        }
    }
}

/// A care task a doctor plans for a nurse on a consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareActivity {
    pub id: ActivityId,
    pub consultation_id: ConsultationId,
    pub nurse_id: UserId,
    pub activity: ActivityKind,
    pub doctor_details: String,
    pub nurse_observations: String,
    pub status: ActivityStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CareActivity {
    pub fn planned(
        consultation_id: ConsultationId,
        nurse_id: UserId,
        activity: ActivityKind,
        doctor_details: impl Into<String>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            consultation_id,
            nurse_id,
            activity,
            doctor_details: doctor_details.into(),
            nurse_observations: String::new(),
            status: ActivityStatus::Scheduled,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
