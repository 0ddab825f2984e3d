//! Request payloads accepted by the workflow engine.
//!
//! Drafts carry what the caller supplies; the engine validates and turns
//! them into persisted entities. Deserialization is lenient (serde
//! defaults for optional parts); validation is the engine's job so that
//! a missing required field becomes a 422, not a 400.

use healthhub_core::{
    Dose, ExamKind, MedicationForm, MetricKind, Priority, RadiologyModality, UserId,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Draft for `create_consultation`. Carrying a non-empty `diagnostic`
/// selects the prescription path; otherwise the exam path runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationDraft {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub summary: String,
    #[serde(default)]
    pub diagnostic: Option<String>,
    #[serde(default)]
    pub prescription: Option<OrdonnanceDraft>,
    #[serde(default)]
    pub exams: Vec<ExamRequest>,
}

impl ConsultationDraft {
    /// The diagnostic, if present and non-blank.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdonnanceDraft {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub lines: Vec<LineDraft>,
}

/// One prescription line. Dose, duration and frequency are required by
/// validation but optional here so the error is ours to shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDraft {
    pub medication_name: String,
    pub medication_form: MedicationForm,
    #[serde(default)]
    pub medication_description: String,
    #[serde(default)]
    pub dose: Option<Dose>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRequest {
    pub kind: ExamKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    /// Technician or radiologist of the matching specialty, from the
    /// patient's hospital.
    pub assignee: UserId,
}

/// Result payload for `submit_result`; the variant must match the exam's
/// kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExamResultDraft {
    Lab {
        report: String,
    },
    Radiology {
        modality: RadiologyModality,
        report: String,
        /// Durable URL from the external image host. Stored opaquely.
        #[serde(default)]
        image_url: Option<String>,
    },
}

impl ExamResultDraft {
    pub fn kind(&self) -> ExamKind {
        match self {
            Self::Lab { .. } => ExamKind::Lab,
            Self::Radiology { .. } => ExamKind::Radiology,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDraft {
    pub metric: MetricKind,
    pub value: f64,
    pub unit: String,
}
