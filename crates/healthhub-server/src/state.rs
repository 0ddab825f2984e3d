//! Shared application state.

use axum::extract::FromRef;
use healthhub_auth::{AuthState, RecordLocator};
use healthhub_storage::{DynClinicalStorage, DynRegistryStorage};
use healthhub_workflow::WorkflowEngine;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub locator: RecordLocator,
    pub engine: WorkflowEngine,
    pub registry: DynRegistryStorage,
    pub clinical: DynClinicalStorage,
}

impl AppState {
    pub fn new(
        registry: DynRegistryStorage,
        clinical: DynClinicalStorage,
        pharmacy_service_key: impl Into<String>,
    ) -> Self {
        Self {
            auth: AuthState::new(registry.clone(), pharmacy_service_key),
            locator: RecordLocator::new(registry.clone()),
            engine: WorkflowEngine::new(registry.clone(), clinical.clone()),
            registry,
            clinical,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
