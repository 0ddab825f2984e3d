//! Clinical workflow engine for the HealthHub server.
//!
//! Owns the rules for how clinical records move between roles: atomic
//! consultation creation, the exam lifecycle, the pharmacy validation
//! channel, nurse care activities and health metrics. Storage stays
//! behind the `healthhub-storage` traits; HTTP stays above, in the
//! server crate.

pub mod drafts;
pub mod engine;
pub mod error;
pub mod exam;
pub mod nursing;
pub mod pharmacy;

#[cfg(test)]
pub(crate) mod testing;

pub use drafts::{
    ConsultationDraft, ExamRequest, ExamResultDraft, LineDraft, MetricDraft, OrdonnanceDraft,
};
pub use engine::{ConsultationOutcome, WorkflowEngine};
pub use error::{Result, WorkflowError};
pub use exam::SubmittedResult;
pub use pharmacy::OrdonnanceDetail;
