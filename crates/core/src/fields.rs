//! Presentation-agnostic field bindings.
//!
//! A host renders the form from descriptors produced here and writes user
//! input back through [`FormState::set_field`] (or the controller wrappers).
//! Every input is addressed by a [`FieldPath`] whose string form matches the
//! JSON keys of the submitted entry, with nested sub-records dotted
//! (`discharge.date`, `sickLeave.startDate`).
//!
//! Bindings:
//! - text and number inputs: [`FieldView`]
//! - entry type radio group: [`VariantOption`]
//! - sick leave checkbox: [`SickLeaveToggle`]
//! - diagnosis multi-select: [`DiagnosisSelection`]

use std::fmt;
use std::str::FromStr;

use crate::constants::{DATE_PLACEHOLDER, MAX_HEALTH_CHECK_RATING, MIN_HEALTH_CHECK_RATING};
use crate::diagnosis::{DiagnosisCatalog, DiagnosisOption};
use crate::draft::{FormState, VariantDraft};
use crate::entry::EntryType;
use crate::error::{FormError, FormResult};
use crate::validation::FieldErrors;

/// Address of one input of the form.
///
/// Variants are declared in display order, so sorted collections of paths list
/// fields the way the form shows them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    EntryType,
    Description,
    Date,
    Specialist,
    DiagnosisCodes,
    DischargeDate,
    DischargeCriteria,
    EmployerName,
    IncludeSickLeave,
    SickLeaveStartDate,
    SickLeaveEndDate,
    HealthCheckRating,
}

impl FieldPath {
    pub const ALL: [FieldPath; 12] = [
        FieldPath::EntryType,
        FieldPath::Description,
        FieldPath::Date,
        FieldPath::Specialist,
        FieldPath::DiagnosisCodes,
        FieldPath::DischargeDate,
        FieldPath::DischargeCriteria,
        FieldPath::EmployerName,
        FieldPath::IncludeSickLeave,
        FieldPath::SickLeaveStartDate,
        FieldPath::SickLeaveEndDate,
        FieldPath::HealthCheckRating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::EntryType => "type",
            FieldPath::Description => "description",
            FieldPath::Date => "date",
            FieldPath::Specialist => "specialist",
            FieldPath::DiagnosisCodes => "diagnosisCodes",
            FieldPath::DischargeDate => "discharge.date",
            FieldPath::DischargeCriteria => "discharge.criteria",
            FieldPath::EmployerName => "employerName",
            FieldPath::IncludeSickLeave => "includeSickLeave",
            FieldPath::SickLeaveStartDate => "sickLeave.startDate",
            FieldPath::SickLeaveEndDate => "sickLeave.endDate",
            FieldPath::HealthCheckRating => "healthCheckRating",
        }
    }

    /// Splits a nested path into its sub-record key and leaf key.
    pub fn split(self) -> (&'static str, Option<&'static str>) {
        match self.as_str().split_once('.') {
            Some((parent, leaf)) => (parent, Some(leaf)),
            None => (self.as_str(), None),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldPath::EntryType => "Entry type",
            FieldPath::Description => "Description",
            FieldPath::Date => "Entry date",
            FieldPath::Specialist => "Specialist",
            FieldPath::DiagnosisCodes => "Diagnoses",
            FieldPath::DischargeDate => "Discharge date",
            FieldPath::DischargeCriteria => "Discharge criteria",
            FieldPath::EmployerName => "Employer name",
            FieldPath::IncludeSickLeave => "Include sick leave",
            FieldPath::SickLeaveStartDate => "Sick leave start date",
            FieldPath::SickLeaveEndDate => "Sick leave end date",
            FieldPath::HealthCheckRating => "Health check rating",
        }
    }

    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            FieldPath::Date
            | FieldPath::DischargeDate
            | FieldPath::SickLeaveStartDate
            | FieldPath::SickLeaveEndDate => Some(DATE_PLACEHOLDER),
            FieldPath::Description
            | FieldPath::Specialist
            | FieldPath::DischargeCriteria
            | FieldPath::EmployerName => Some(self.label()),
            FieldPath::EntryType
            | FieldPath::DiagnosisCodes
            | FieldPath::IncludeSickLeave
            | FieldPath::HealthCheckRating => None,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldPath::EntryType => FieldKind::Radio,
            FieldPath::DiagnosisCodes => FieldKind::MultiSelect,
            FieldPath::IncludeSickLeave => FieldKind::Checkbox,
            FieldPath::HealthCheckRating => FieldKind::Number {
                min: MIN_HEALTH_CHECK_RATING,
                max: MAX_HEALTH_CHECK_RATING,
            },
            FieldPath::Description
            | FieldPath::Date
            | FieldPath::Specialist
            | FieldPath::DischargeDate
            | FieldPath::DischargeCriteria
            | FieldPath::EmployerName
            | FieldPath::SickLeaveStartDate
            | FieldPath::SickLeaveEndDate => FieldKind::Text,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::ALL
            .into_iter()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// The kind of input a field is rendered as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number { min: u8, max: u8 },
    MultiSelect,
    Radio,
    Checkbox,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("text"),
            FieldKind::Number { min, max } => write!(f, "number ({min}..={max})"),
            FieldKind::MultiSelect => f.write_str("multi-select"),
            FieldKind::Radio => f.write_str("radio"),
            FieldKind::Checkbox => f.write_str("checkbox"),
        }
    }
}

/// Current value of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Codes(Vec<String>),
    Type(Option<EntryType>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Descriptor of one rendered input.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldView {
    pub path: FieldPath,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub error: Option<String>,
}

/// One option of the entry type radio group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantOption {
    pub entry_type: EntryType,
    pub label: &'static str,
    pub checked: bool,
}

/// The "include sick leave" checkbox, present only for occupational entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SickLeaveToggle {
    pub label: &'static str,
    pub checked: bool,
}

/// Diagnosis multi-select bound to the current selection and a catalog.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosisSelection<'a> {
    codes: &'a [String],
    catalog: &'a DiagnosisCatalog,
}

impl<'a> DiagnosisSelection<'a> {
    pub fn new(codes: &'a [String], catalog: &'a DiagnosisCatalog) -> Self {
        Self { codes, catalog }
    }

    /// Selected codes in selection order.
    pub fn selected(&self) -> &'a [String] {
        self.codes
    }

    /// Labels of the selected codes, in selection order.
    pub fn selected_labels(&self) -> Vec<String> {
        self.codes
            .iter()
            .map(|code| self.catalog.label_for(code))
            .collect()
    }

    /// Every option the catalog offers.
    pub fn options(&self) -> Vec<DiagnosisOption> {
        self.catalog.options()
    }
}

impl FormState {
    /// Reads the current value at `path`.
    ///
    /// Returns `None` if the field does not exist in the current variant.
    pub fn field(&self, path: FieldPath) -> Option<FieldValue> {
        let value = match (path, &self.variant) {
            (FieldPath::EntryType, variant) => FieldValue::Type(variant.entry_type()),
            (FieldPath::Description, _) => FieldValue::Text(self.base.description.clone()),
            (FieldPath::Date, _) => FieldValue::Text(self.base.date.clone()),
            (FieldPath::Specialist, _) => FieldValue::Text(self.base.specialist.clone()),
            (FieldPath::DiagnosisCodes, _) => FieldValue::Codes(self.base.diagnosis_codes.clone()),
            (FieldPath::DischargeDate, VariantDraft::Hospital(d)) => {
                FieldValue::Text(d.discharge.date.clone())
            }
            (FieldPath::DischargeCriteria, VariantDraft::Hospital(d)) => {
                FieldValue::Text(d.discharge.criteria.clone())
            }
            (FieldPath::EmployerName, VariantDraft::OccupationalHealthcare(d)) => {
                FieldValue::Text(d.employer_name.clone())
            }
            (FieldPath::IncludeSickLeave, VariantDraft::OccupationalHealthcare(d)) => {
                FieldValue::Flag(d.include_sick_leave)
            }
            (FieldPath::SickLeaveStartDate, VariantDraft::OccupationalHealthcare(d)) => {
                FieldValue::Text(d.sick_leave.start_date.clone())
            }
            (FieldPath::SickLeaveEndDate, VariantDraft::OccupationalHealthcare(d)) => {
                FieldValue::Text(d.sick_leave.end_date.clone())
            }
            (FieldPath::HealthCheckRating, VariantDraft::HealthCheck(d)) => {
                FieldValue::Number(d.health_check_rating)
            }
            _ => return None,
        };
        Some(value)
    }

    /// Writes one text or number field.
    ///
    /// The entry type, the sick leave checkbox and the diagnosis selection have
    /// their own operations and are rejected here.
    ///
    /// # Errors
    ///
    /// - [`FormError::NotSettable`] for the entry type, checkbox and diagnosis paths
    /// - [`FormError::FieldNotInVariant`] if the selected variant has no such field
    /// - [`FormError::ValueKindMismatch`] if `value` is not the field's kind
    pub fn set_field(&mut self, path: FieldPath, value: FieldValue) -> FormResult<()> {
        if matches!(
            path,
            FieldPath::EntryType | FieldPath::DiagnosisCodes | FieldPath::IncludeSickLeave
        ) {
            return Err(FormError::NotSettable(path));
        }

        let state = self.variant.state_name();
        let slot = match (path, &mut self.variant) {
            (FieldPath::Description, _) => Slot::Text(&mut self.base.description),
            (FieldPath::Date, _) => Slot::Text(&mut self.base.date),
            (FieldPath::Specialist, _) => Slot::Text(&mut self.base.specialist),
            (FieldPath::DischargeDate, VariantDraft::Hospital(d)) => {
                Slot::Text(&mut d.discharge.date)
            }
            (FieldPath::DischargeCriteria, VariantDraft::Hospital(d)) => {
                Slot::Text(&mut d.discharge.criteria)
            }
            (FieldPath::EmployerName, VariantDraft::OccupationalHealthcare(d)) => {
                Slot::Text(&mut d.employer_name)
            }
            (FieldPath::SickLeaveStartDate, VariantDraft::OccupationalHealthcare(d)) => {
                Slot::Text(&mut d.sick_leave.start_date)
            }
            (FieldPath::SickLeaveEndDate, VariantDraft::OccupationalHealthcare(d)) => {
                Slot::Text(&mut d.sick_leave.end_date)
            }
            (FieldPath::HealthCheckRating, VariantDraft::HealthCheck(d)) => {
                Slot::Number(&mut d.health_check_rating)
            }
            _ => return Err(FormError::FieldNotInVariant { path, state }),
        };

        match (slot, value) {
            (Slot::Text(target), FieldValue::Text(text)) => *target = text,
            (Slot::Number(target), FieldValue::Number(number)) => *target = number,
            _ => {
                return Err(FormError::ValueKindMismatch {
                    path,
                    expected: path.kind(),
                })
            }
        }
        Ok(())
    }

    /// Paths of the inputs shown for the current state, in display order.
    ///
    /// The entry type radio group is always shown above these and is not listed.
    pub fn visible_fields(&self) -> Vec<FieldPath> {
        let mut fields = vec![
            FieldPath::Description,
            FieldPath::Date,
            FieldPath::Specialist,
            FieldPath::DiagnosisCodes,
        ];
        match &self.variant {
            VariantDraft::Unselected => {}
            VariantDraft::Hospital(_) => {
                fields.extend([FieldPath::DischargeDate, FieldPath::DischargeCriteria]);
            }
            VariantDraft::OccupationalHealthcare(d) => {
                fields.extend([FieldPath::EmployerName, FieldPath::IncludeSickLeave]);
                if d.include_sick_leave {
                    fields.extend([FieldPath::SickLeaveStartDate, FieldPath::SickLeaveEndDate]);
                }
            }
            VariantDraft::HealthCheck(_) => fields.push(FieldPath::HealthCheckRating),
        }
        fields
    }

    /// Descriptors for every visible input, with errors from `errors` attached.
    pub fn field_views(&self, errors: &FieldErrors) -> Vec<FieldView> {
        self.visible_fields()
            .into_iter()
            .filter_map(|path| {
                let value = self.field(path)?;
                Some(FieldView {
                    path,
                    label: path.label(),
                    placeholder: path.placeholder(),
                    kind: path.kind(),
                    value,
                    error: errors.get(path).map(str::to_string),
                })
            })
            .collect()
    }

    /// The entry type radio group.
    pub fn variant_options(&self) -> [VariantOption; 3] {
        let active = self.entry_type();
        EntryType::ALL.map(|entry_type| VariantOption {
            entry_type,
            label: entry_type.label(),
            checked: active == Some(entry_type),
        })
    }

    /// The sick leave checkbox, or `None` outside the occupational variant.
    pub fn sick_leave_toggle(&self) -> Option<SickLeaveToggle> {
        match &self.variant {
            VariantDraft::OccupationalHealthcare(d) => Some(SickLeaveToggle {
                label: FieldPath::IncludeSickLeave.label(),
                checked: d.include_sick_leave,
            }),
            _ => None,
        }
    }
}

enum Slot<'a> {
    Text(&'a mut String),
    Number(&'a mut f64),
}
