//! In-memory storage backend for the HealthHub server.
//!
//! Implements both storage traits from `healthhub-storage` on papaya
//! lock-free maps. Used as the test substrate and for single-node
//! deployments; the production relational store is an external
//! collaborator behind the same traits.

mod clinical;
mod registry;
mod storage;
mod transaction;

pub use storage::InMemoryStorage;

// Re-export the traits for convenience
pub use healthhub_storage::{ClinicalStorage, RegistryStorage, StorageError};

use std::sync::Arc;

/// Creates a storage instance shared between the registry and clinical
/// trait objects.
pub fn create_storage() -> (
    healthhub_storage::DynRegistryStorage,
    healthhub_storage::DynClinicalStorage,
) {
    let storage = Arc::new(InMemoryStorage::new());
    (storage.clone(), storage)
}
