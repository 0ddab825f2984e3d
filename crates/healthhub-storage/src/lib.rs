//! Storage abstraction layer for the HealthHub server.
//!
//! Defines the async traits every storage backend must implement. The
//! relational datastore itself is an external collaborator; backends only
//! promise the contracts here, most importantly multi-statement atomicity
//! for consultation creation via [`ClinicalTransaction`].

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::{ClinicalStorage, ClinicalTransaction, RegistryStorage};
pub use types::ExamFilter;

/// Type alias for a shareable registry storage instance.
pub type DynRegistryStorage = std::sync::Arc<dyn RegistryStorage>;

/// Type alias for a shareable clinical storage instance.
pub type DynClinicalStorage = std::sync::Arc<dyn ClinicalStorage>;
