//! Core domain types for the HealthHub hospital server.
//!
//! This crate defines the entities shared by every other crate in the
//! workspace: identifiers, the closed role model, principals and their role
//! profiles, the hospital registry entities (hospital, patient, medical
//! record) and the clinical entities (consultation, exam, prescription,
//! results) together with their status state machines.

pub mod clinical;
pub mod error;
pub mod id;
pub mod patient;
pub mod principal;
pub mod role;

pub use clinical::{
    ActivityKind, ActivityStatus, CareActivity, Consultation, Dose, ExamKind, Examen,
    HealthMetric, LabResult, Medication, MedicationForm, MetricKind, Ordonnance, OrdonnanceLine,
    Priority, RadiologyModality, RadiologyResult, WorkflowStatus,
};
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{
    ActivityId, ConsultationId, ExamId, HospitalId, LabResultId, MedicationId, MetricId,
    OrdonnanceId, RadiologyResultId, RecordId, UserId,
};
pub use patient::{Hospital, MedicalRecord, Patient};
pub use principal::{
    DoctorProfile, NurseProfile, PharmacistProfile, Principal, RoleProfile, Shift, TechProfile,
    User,
};
pub use role::Role;
