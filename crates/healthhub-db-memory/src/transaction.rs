//! Journal-based transaction over the in-memory maps.
//!
//! Operations apply to the shared maps as they are issued and each one
//! pushes its inverse onto a journal. `rollback` replays the journal in
//! reverse; `commit` discards it. Concurrent readers may observe rows from
//! an uncommitted transaction, which matches what the single-writer
//! consultation path needs.

use async_trait::async_trait;
use healthhub_core::{
    Consultation, ConsultationId, ExamId, Examen, Medication, MedicationForm, MedicationId,
    Ordonnance, OrdonnanceId, OrdonnanceLine, UserId, WorkflowStatus,
};
use healthhub_storage::{ClinicalTransaction, StorageError};

use crate::storage::InMemoryStorage;

/// Inverse of one applied operation.
enum UndoOp {
    RemoveConsultation(ConsultationId),
    RestoreConsultationStatus(ConsultationId, WorkflowStatus),
    RemoveOrdonnance(OrdonnanceId),
    RemoveLastLine(OrdonnanceId),
    RemoveMedication(MedicationId, (String, MedicationForm)),
    RemoveExam(ExamId),
    DecrementCounter(UserId),
}

pub(crate) struct MemoryTransaction {
    storage: InMemoryStorage,
    journal: Vec<UndoOp>,
    finished: bool,
}

impl MemoryTransaction {
    pub(crate) fn new(storage: InMemoryStorage) -> Self {
        Self {
            storage,
            journal: Vec::new(),
            finished: false,
        }
    }

    fn undo_all(&mut self) {
        let maps = &self.storage.inner;
        while let Some(op) = self.journal.pop() {
            match op {
                UndoOp::RemoveConsultation(id) => {
                    maps.consultations.pin().remove(&id);
                }
                UndoOp::RestoreConsultationStatus(id, status) => {
                    maps.consultations.pin().update(id, |c| {
                        let mut c = c.clone();
                        c.status = status;
                        c
                    });
                }
                UndoOp::RemoveOrdonnance(id) => {
                    maps.ordonnances.pin().remove(&id);
                }
                UndoOp::RemoveLastLine(id) => {
                    maps.lines.pin().update(id, |lines| {
                        let mut lines = lines.clone();
                        lines.pop();
                        lines
                    });
                }
                UndoOp::RemoveMedication(id, key) => {
                    maps.medication_index.pin().remove(&key);
                    maps.medications.pin().remove(&id);
                }
                UndoOp::RemoveExam(id) => {
                    maps.exams.pin().remove(&id);
                }
                UndoOp::DecrementCounter(tech_id) => {
                    maps.counters
                        .pin()
                        .update_or_insert(tech_id, |c| c.saturating_sub(1), 0);
                }
            }
        }
    }
}

#[async_trait]
impl ClinicalTransaction for MemoryTransaction {
    async fn insert_consultation(
        &mut self,
        consultation: &Consultation,
    ) -> Result<(), StorageError> {
        let guard = self.storage.inner.consultations.pin();
        if guard.get(&consultation.id).is_some() {
            return Err(StorageError::already_exists("Consultation", consultation.id));
        }
        guard.insert(consultation.id, consultation.clone());
        self.journal.push(UndoOp::RemoveConsultation(consultation.id));
        Ok(())
    }

    async fn set_consultation_status(
        &mut self,
        id: ConsultationId,
        status: WorkflowStatus,
    ) -> Result<(), StorageError> {
        let guard = self.storage.inner.consultations.pin();
        let previous = guard
            .get(&id)
            .map(|c| c.status)
            .ok_or_else(|| StorageError::not_found("Consultation", id))?;
        guard.update(id, |c| {
            let mut c = c.clone();
            c.status = status;
            c
        });
        self.journal
            .push(UndoOp::RestoreConsultationStatus(id, previous));
        Ok(())
    }

    async fn insert_ordonnance(&mut self, ordonnance: &Ordonnance) -> Result<(), StorageError> {
        let guard = self.storage.inner.ordonnances.pin();
        if guard.get(&ordonnance.id).is_some() {
            return Err(StorageError::already_exists("Ordonnance", ordonnance.id));
        }
        guard.insert(ordonnance.id, ordonnance.clone());
        self.journal.push(UndoOp::RemoveOrdonnance(ordonnance.id));
        Ok(())
    }

    async fn insert_line(&mut self, line: &OrdonnanceLine) -> Result<(), StorageError> {
        let guard = self.storage.inner.lines.pin();
        guard.update_or_insert(
            line.ordonnance_id,
            |lines| {
                let mut lines = lines.clone();
                lines.push(line.clone());
                lines
            },
            vec![line.clone()],
        );
        self.journal.push(UndoOp::RemoveLastLine(line.ordonnance_id));
        Ok(())
    }

    async fn resolve_or_insert_medication(
        &mut self,
        name: &str,
        form: MedicationForm,
        description: &str,
    ) -> Result<Medication, StorageError> {
        let key = (name.to_string(), form);
        let index = self.storage.inner.medication_index.pin();
        if let Some(id) = index.get(&key) {
            return self
                .storage
                .inner
                .medications
                .pin()
                .get(id)
                .cloned()
                .ok_or_else(|| StorageError::backend("medication index points at missing row"));
        }
        let medication = Medication {
            id: MedicationId::new(),
            name: name.to_string(),
            form,
            description: description.to_string(),
        };
        self.storage
            .inner
            .medications
            .pin()
            .insert(medication.id, medication.clone());
        index.insert(key.clone(), medication.id);
        self.journal.push(UndoOp::RemoveMedication(medication.id, key));
        Ok(medication)
    }

    async fn insert_exam(&mut self, exam: &Examen) -> Result<(), StorageError> {
        let guard = self.storage.inner.exams.pin();
        if guard.get(&exam.id).is_some() {
            return Err(StorageError::already_exists("Examen", exam.id));
        }
        guard.insert(exam.id, exam.clone());
        self.journal.push(UndoOp::RemoveExam(exam.id));
        Ok(())
    }

    async fn increment_pending_tests(&mut self, tech_id: UserId) -> Result<(), StorageError> {
        self.storage
            .inner
            .counters
            .pin()
            .update_or_insert(tech_id, |c| c + 1, 1);
        self.journal.push(UndoOp::DecrementCounter(tech_id));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        self.journal.clear();
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        self.undo_all();
        self.finished = true;
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                pending_ops = self.journal.len(),
                "transaction dropped without commit or rollback, undoing"
            );
            self.undo_all();
        }
    }
}
