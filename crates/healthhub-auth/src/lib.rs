//! Authentication context and access policy engine for the HealthHub
//! server.
//!
//! The crate owns three concerns: resolving who is making a request
//! (bearer tokens for people, a service key for the pharmacy
//! integration), deciding whether that principal may see a given patient
//! (the access policy engine), and finding the patient in the first place
//! (the record locator).

pub mod error;
pub mod locator;
pub mod middleware;
pub mod policy;

pub use error::AuthError;
pub use locator::RecordLocator;
pub use middleware::{AuthState, BearerPrincipal, PharmacyService, SERVICE_KEY_HEADER};
pub use policy::{AccessDecision, AccessGrant, DenyReason, evaluate};
