//! Prescription validation channel for the external pharmacy service.
//!
//! Exactly three operations, all key-authenticated upstream: list the
//! unvalidated prescriptions, fetch one with its lines, validate one.
//! Validation is one-way and idempotent.

use healthhub_core::{Ordonnance, OrdonnanceId, OrdonnanceLine};
use serde::Serialize;

use crate::engine::WorkflowEngine;
use crate::error::{Result, WorkflowError};

#[derive(Debug, Clone, Serialize)]
pub struct OrdonnanceDetail {
    #[serde(flatten)]
    pub ordonnance: Ordonnance,
    pub lines: Vec<OrdonnanceLine>,
}

impl WorkflowEngine {
    pub async fn unvalidated_ordonnances(&self) -> Result<Vec<Ordonnance>> {
        Ok(self.clinical.list_unvalidated_ordonnances().await?)
    }

    pub async fn ordonnance_detail(&self, id: OrdonnanceId) -> Result<OrdonnanceDetail> {
        let ordonnance = self
            .clinical
            .get_ordonnance(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Ordonnance", id))?;
        let lines = self.clinical.lines_for_ordonnance(id).await?;
        Ok(OrdonnanceDetail { ordonnance, lines })
    }

    /// `validated: false -> true`, idempotent.
    pub async fn validate_ordonnance(&self, id: OrdonnanceId) -> Result<Ordonnance> {
        let ordonnance = self.clinical.mark_ordonnance_validated(id).await.map_err(
            |err| match err {
                err if err.is_not_found() => WorkflowError::not_found("Ordonnance", id),
                other => WorkflowError::Storage(other),
            },
        )?;
        tracing::info!(ordonnance_id = %id, "prescription validated by pharmacy");
        Ok(ordonnance)
    }
}
