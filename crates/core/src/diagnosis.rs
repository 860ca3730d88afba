//! Diagnosis reference data.
//!
//! Diagnoses are read-only reference data owned by the host. The form uses the
//! catalog only to label codes; a code missing from the catalog is still a
//! valid selection and is shown as the bare code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A diagnosis from the catalog, keyed by its code (for example ICD-10 `S03.5`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}

impl Diagnosis {
    /// Display label in the `"<name> (<code>)"` form used by the selection dropdown.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

/// One option of the diagnosis multi-select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosisOption {
    pub code: String,
    pub label: String,
}

/// Read-only catalog of diagnoses keyed by code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosisCatalog {
    by_code: HashMap<String, Diagnosis>,
}

impl DiagnosisCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list; a later duplicate code replaces an earlier one.
    pub fn from_list(diagnoses: impl IntoIterator<Item = Diagnosis>) -> Self {
        let by_code = diagnoses
            .into_iter()
            .map(|diagnosis| (diagnosis.code.clone(), diagnosis))
            .collect();
        Self { by_code }
    }

    /// Parses a catalog from the JSON array served by `/api/diagnoses`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let diagnoses: Vec<Diagnosis> = serde_json::from_str(text)?;
        Ok(Self::from_list(diagnoses))
    }

    pub fn get(&self, code: &str) -> Option<&Diagnosis> {
        self.by_code.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Label for a code, falling back to the code itself when it is not in the catalog.
    pub fn label_for(&self, code: &str) -> String {
        self.get(code)
            .map(Diagnosis::label)
            .unwrap_or_else(|| code.to_string())
    }

    /// Options for the multi-select, ordered by code so the list is stable.
    pub fn options(&self) -> Vec<DiagnosisOption> {
        let mut options: Vec<DiagnosisOption> = self
            .by_code
            .values()
            .map(|diagnosis| DiagnosisOption {
                code: diagnosis.code.clone(),
                label: diagnosis.label(),
            })
            .collect();
        options.sort_by(|a, b| a.code.cmp(&b.code));
        options
    }
}
