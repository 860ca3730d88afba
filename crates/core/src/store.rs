//! Client-side cache of patients and diagnoses.
//!
//! The host owns the store and applies [`StoreAction`]s to it as API responses
//! arrive. The entry form never reads the store directly; it is handed a
//! [`DiagnosisCatalog`] snapshot from [`PatientStore::diagnoses`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::diagnosis::{Diagnosis, DiagnosisCatalog};
use crate::entry::Entry;
use crate::patient::Patient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("patient {0} is not in the store")]
    UnknownPatient(String),
    #[error("malformed patient data: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A change to apply to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreAction {
    /// Adds patients from a list response. Patients already cached are kept,
    /// since the list endpoint omits entries.
    SetPatientList(Vec<Patient>),
    /// Inserts or replaces one fully loaded patient.
    AddPatient(Patient),
    /// Replaces the diagnosis catalog.
    SetDiagnosisList(Vec<Diagnosis>),
    /// Appends a stored entry to a cached patient.
    AddEntry { patient_id: String, entry: Entry },
}

#[derive(Debug, Default)]
pub struct PatientStore {
    patients: HashMap<String, Patient>,
    diagnoses: Arc<DiagnosisCatalog>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `action`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownPatient`] when an entry is added for a
    /// patient that is not cached. The store is left unchanged.
    pub fn reduce(&mut self, action: StoreAction) -> StoreResult<()> {
        match action {
            StoreAction::SetPatientList(patients) => {
                let count = patients.len();
                for patient in patients {
                    self.patients.entry(patient.id.clone()).or_insert(patient);
                }
                tracing::debug!(count, cached = self.patients.len(), "patient list merged");
            }
            StoreAction::AddPatient(patient) => {
                tracing::debug!(patient_id = %patient.id, "patient cached");
                self.patients.insert(patient.id.clone(), patient);
            }
            StoreAction::SetDiagnosisList(diagnoses) => {
                self.diagnoses = Arc::new(DiagnosisCatalog::from_list(diagnoses));
                tracing::debug!(count = self.diagnoses.len(), "diagnosis catalog replaced");
            }
            StoreAction::AddEntry { patient_id, entry } => {
                let patient = self
                    .patients
                    .get_mut(&patient_id)
                    .ok_or_else(|| StoreError::UnknownPatient(patient_id.clone()))?;
                tracing::debug!(patient_id = %patient_id, entry_id = %entry.id, "entry added");
                patient.entries.push(entry);
            }
        }
        Ok(())
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.get(id)
    }

    /// Cached patients ordered by id.
    pub fn patients(&self) -> Vec<&Patient> {
        let mut patients: Vec<&Patient> = self.patients.values().collect();
        patients.sort_by(|a, b| a.id.cmp(&b.id));
        patients
    }

    /// Snapshot of the diagnosis catalog for an entry form.
    pub fn diagnoses(&self) -> Arc<DiagnosisCatalog> {
        Arc::clone(&self.diagnoses)
    }
}
