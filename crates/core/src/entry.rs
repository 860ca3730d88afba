//! Medical entry model and its JSON wire shape.
//!
//! An [`Entry`] is what the patients API stores and returns. A [`NewEntry`] is
//! the same record without an id: the normalized payload the entry form hands
//! to the submit callback. Both serialize to the camelCase shape the REST API
//! speaks, with the variant carried in a `type` field:
//!
//! ```json
//! {
//!   "description": "Yearly control visit.",
//!   "date": "2019-10-20",
//!   "specialist": "MD House",
//!   "diagnosisCodes": [],
//!   "type": "HealthCheck",
//!   "healthCheckRating": 0
//! }
//! ```

use chrono::NaiveDate;
use patientor_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_HEALTH_CHECK_RATING, MIN_HEALTH_CHECK_RATING};
use crate::error::{FormError, SubmitError};

/// The entry variant discriminant, as carried in the `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    Hospital,
    OccupationalHealthcare,
    HealthCheck,
}

impl EntryType {
    /// Every variant in display order.
    pub const ALL: [EntryType; 3] = [
        EntryType::Hospital,
        EntryType::OccupationalHealthcare,
        EntryType::HealthCheck,
    ];

    /// Wire name of the variant.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Hospital => "Hospital",
            EntryType::OccupationalHealthcare => "OccupationalHealthcare",
            EntryType::HealthCheck => "HealthCheck",
        }
    }

    /// Label of the radio option that selects this variant.
    pub fn label(self) -> &'static str {
        match self {
            EntryType::Hospital => "Hospital entry",
            EntryType::OccupationalHealthcare => "Occupational healthcare entry",
            EntryType::HealthCheck => "Health check entry",
        }
    }

    /// Parses a variant from its wire name.
    ///
    /// Matching is case-insensitive and ignores `-` and `_`, so command line
    /// spellings such as `health-check` are accepted.
    pub fn parse(s: &str) -> Result<Self, FormError> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "hospital" => Ok(Self::Hospital),
            "occupationalhealthcare" | "occupational" => Ok(Self::OccupationalHealthcare),
            "healthcheck" => Ok(Self::HealthCheck),
            _ => Err(FormError::UnknownEntryType(s.to_string())),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health check outcome, serialized as its integer value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HealthCheckRating {
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl HealthCheckRating {
    pub const ALL: [HealthCheckRating; 4] = [
        HealthCheckRating::Healthy,
        HealthCheckRating::LowRisk,
        HealthCheckRating::HighRisk,
        HealthCheckRating::CriticalRisk,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Healthy),
            1 => Some(Self::LowRisk),
            2 => Some(Self::HighRisk),
            3 => Some(Self::CriticalRisk),
            _ => None,
        }
    }

    /// Converts a number input into a rating.
    ///
    /// Only finite whole numbers inside the enumerated range convert.
    pub fn from_number(value: f64) -> Option<Self> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        if value < f64::from(MIN_HEALTH_CHECK_RATING) || value > f64::from(MAX_HEALTH_CHECK_RATING)
        {
            return None;
        }
        Self::from_u8(value as u8)
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::LowRisk => "Low risk",
            Self::HighRisk => "High risk",
            Self::CriticalRisk => "Critical risk",
        }
    }
}

impl Serialize for HealthCheckRating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for HealthCheckRating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        HealthCheckRating::from_u8(value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "health check rating must be between {MIN_HEALTH_CHECK_RATING} and {MAX_HEALTH_CHECK_RATING}, got {value}"
            ))
        })
    }
}

/// Discharge details of a hospital stay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discharge {
    pub date: NaiveDate,
    pub criteria: NonEmptyText,
}

/// Sick leave granted during an occupational healthcare visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Variant-specific part of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryDetails {
    Hospital {
        discharge: Discharge,
    },
    #[serde(rename_all = "camelCase")]
    OccupationalHealthcare {
        employer_name: NonEmptyText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sick_leave: Option<SickLeave>,
    },
    #[serde(rename_all = "camelCase")]
    HealthCheck {
        health_check_rating: HealthCheckRating,
    },
}

impl EntryDetails {
    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryDetails::Hospital { .. } => EntryType::Hospital,
            EntryDetails::OccupationalHealthcare { .. } => EntryType::OccupationalHealthcare,
            EntryDetails::HealthCheck { .. } => EntryType::HealthCheck,
        }
    }
}

/// An entry as submitted to the API, before it has been assigned an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub description: NonEmptyText,
    pub date: NaiveDate,
    pub specialist: NonEmptyText,
    #[serde(default)]
    pub diagnosis_codes: Vec<String>,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl NewEntry {
    pub fn entry_type(&self) -> EntryType {
        self.details.entry_type()
    }

    /// Attaches the id the API assigned.
    pub fn with_id(self, id: impl Into<String>) -> Entry {
        Entry {
            id: id.into(),
            entry: self,
        }
    }
}

/// A stored entry of a patient's record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub entry: NewEntry,
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        self.entry.entry_type()
    }

    /// Parse an entry from the JSON body returned by the API.
    ///
    /// This uses `serde_path_to_error` so the error names the offending field
    /// (for example `discharge.date`).
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::MalformedResponse`] if the body is not valid JSON
    /// or does not have the shape of an entry.
    pub fn parse_json(text: &str) -> Result<Entry, SubmitError> {
        let mut deserializer = serde_json::Deserializer::from_str(text);

        let entry = match serde_path_to_error::deserialize::<_, Entry>(&mut deserializer) {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(SubmitError::MalformedResponse(format!(
                    "entry schema mismatch at {path}: {source}"
                )));
            }
        };

        deserializer
            .end()
            .map_err(|e| SubmitError::MalformedResponse(format!("trailing data after entry: {e}")))?;

        Ok(entry)
    }
}
