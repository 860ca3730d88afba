//! Patient records as served by the patients API.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A patient with the entries recorded so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Patient {
    /// Parse a patient from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface the path to the failing field
    /// (e.g. `entries[0].discharge.date`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if the text does not have the shape of a patient.
    pub fn parse_json(text: &str) -> Result<Patient, StoreError> {
        let mut deserializer = serde_json::Deserializer::from_str(text);

        match serde_path_to_error::deserialize::<_, Patient>(&mut deserializer) {
            Ok(patient) => Ok(patient),
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                Err(StoreError::Malformed(format!(
                    "patient schema mismatch at {path}: {source}"
                )))
            }
        }
    }
}
