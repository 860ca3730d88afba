//! Validation of the add-entry form.
//!
//! [`validate`] is a pure function of the form state. It is re-run after every
//! change to drive the submit button and once more on submit as the
//! authoritative gate. The result maps field paths to messages; a path is
//! present only when that field is invalid.

use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};

use patientor_types::NonEmptyText;
use serde_json::{Map, Value};

use crate::config::FormConfig;
use crate::constants::{
    DATE_ERROR, DUPLICATE_DIAGNOSIS_ERROR, RATING_ERROR, REQUIRED_ERROR, SICK_LEAVE_ORDER_ERROR,
    TYPE_REQUIRED_ERROR,
};
use crate::draft::{FormState, VariantDraft};
use crate::entry::HealthCheckRating;
use crate::fields::FieldPath;
use crate::validators::parse_date;

/// Field path to message. Empty means the form is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<FieldPath, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `path`, replacing any earlier message.
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.insert(path, message.into());
    }

    pub fn get(&self, path: FieldPath) -> Option<&str> {
        self.errors.get(&path).map(String::as_str)
    }

    pub fn contains(&self, path: FieldPath) -> bool {
        self.errors.contains_key(&path)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Errors in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &str)> {
        self.errors.iter().map(|(path, msg)| (*path, msg.as_str()))
    }

    /// Keeps only the errors whose path satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(FieldPath) -> bool) {
        self.errors.retain(|path, _| keep(*path));
    }

    /// Renders the errors as a JSON object shaped like the entry.
    ///
    /// Nested paths become nested objects:
    /// `{"discharge": {"criteria": "Field is required"}}`.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (path, message) in self.iter() {
            let message = Value::String(message.to_string());
            match path.split() {
                (key, None) => {
                    root.insert(key.to_string(), message);
                }
                (parent, Some(leaf)) => {
                    let child = root
                        .entry(parent.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(child) = child {
                        child.insert(leaf.to_string(), message);
                    }
                }
            }
        }
        Value::Object(root)
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = (&'a FieldPath, &'a String);
    type IntoIter = btree_map::Iter<'a, FieldPath, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Validates `state` with the default policies.
pub fn validate(state: &FormState) -> FieldErrors {
    validate_with(state, &FormConfig::default())
}

/// Validates `state`, applying the optional policies enabled in `config`.
pub fn validate_with(state: &FormState, config: &FormConfig) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if state.is_unselected() {
        errors.insert(FieldPath::EntryType, TYPE_REQUIRED_ERROR);
    }

    require_text(&mut errors, FieldPath::Description, &state.base.description);
    require_date(&mut errors, FieldPath::Date, &state.base.date);
    require_text(&mut errors, FieldPath::Specialist, &state.base.specialist);

    if config.reject_duplicate_diagnosis_codes() {
        let mut seen = HashSet::new();
        if !state.base.diagnosis_codes.iter().all(|code| seen.insert(code)) {
            errors.insert(FieldPath::DiagnosisCodes, DUPLICATE_DIAGNOSIS_ERROR);
        }
    }

    match &state.variant {
        VariantDraft::Unselected => {}
        VariantDraft::Hospital(draft) => {
            require_date(&mut errors, FieldPath::DischargeDate, &draft.discharge.date);
            require_text(
                &mut errors,
                FieldPath::DischargeCriteria,
                &draft.discharge.criteria,
            );
        }
        VariantDraft::OccupationalHealthcare(draft) => {
            require_text(&mut errors, FieldPath::EmployerName, &draft.employer_name);
            if draft.include_sick_leave {
                let start = require_date(
                    &mut errors,
                    FieldPath::SickLeaveStartDate,
                    &draft.sick_leave.start_date,
                );
                let end = require_date(
                    &mut errors,
                    FieldPath::SickLeaveEndDate,
                    &draft.sick_leave.end_date,
                );
                if let (Some(start), Some(end)) = (start, end) {
                    if config.require_sick_leave_order() && end < start {
                        errors.insert(FieldPath::SickLeaveEndDate, SICK_LEAVE_ORDER_ERROR);
                    }
                }
            }
        }
        VariantDraft::HealthCheck(draft) => {
            if HealthCheckRating::from_number(draft.health_check_rating).is_none() {
                errors.insert(FieldPath::HealthCheckRating, RATING_ERROR);
            }
        }
    }

    errors
}

fn require_text(errors: &mut FieldErrors, path: FieldPath, value: &str) {
    if !NonEmptyText::is_valid(value) {
        errors.insert(path, REQUIRED_ERROR);
    }
}

// An empty date reports the date message, not the required one.
fn require_date(
    errors: &mut FieldErrors,
    path: FieldPath,
    value: &str,
) -> Option<chrono::NaiveDate> {
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.insert(path, DATE_ERROR);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{
        BaseDraft, DischargeDraft, HealthCheckDraft, HospitalDraft, OccupationalDraft,
        SickLeaveDraft,
    };
    use crate::entry::EntryType;
    use serde_json::json;

    fn filled_base() -> BaseDraft {
        BaseDraft {
            description: "Yearly control visit".into(),
            date: "2019-10-20".into(),
            specialist: "MD House".into(),
            diagnosis_codes: vec![],
        }
    }

    fn occupational(include_sick_leave: bool, start: &str, end: &str) -> FormState {
        FormState {
            base: filled_base(),
            variant: VariantDraft::OccupationalHealthcare(OccupationalDraft {
                employer_name: "HyPD".into(),
                include_sick_leave,
                sick_leave: SickLeaveDraft {
                    start_date: start.into(),
                    end_date: end.into(),
                },
            }),
        }
    }

    #[test]
    fn test_initial_state_is_invalid() {
        let errors = validate(&FormState::new());
        assert_eq!(errors.get(FieldPath::EntryType), Some(TYPE_REQUIRED_ERROR));
        assert_eq!(errors.get(FieldPath::Description), Some(REQUIRED_ERROR));
        assert_eq!(errors.get(FieldPath::Date), Some(DATE_ERROR));
        assert_eq!(errors.get(FieldPath::Specialist), Some(REQUIRED_ERROR));
    }

    #[test]
    fn test_unselected_is_invalid_even_with_common_fields_filled() {
        let state = FormState {
            base: filled_base(),
            variant: VariantDraft::Unselected,
        };
        let errors = validate(&state);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(FieldPath::EntryType));
    }

    #[test]
    fn test_whitespace_only_text_is_required() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::HealthCheck(HealthCheckDraft::default()),
        };
        state.base.specialist = "   ".into();
        assert_eq!(validate(&state).get(FieldPath::Specialist), Some(REQUIRED_ERROR));
    }

    #[test]
    fn test_hospital_missing_criteria_keyed_under_nested_path() {
        let state = FormState {
            base: filled_base(),
            variant: VariantDraft::Hospital(HospitalDraft {
                discharge: DischargeDraft {
                    date: "2019-10-25".into(),
                    criteria: String::new(),
                },
            }),
        };
        let errors = validate(&state);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldPath::DischargeCriteria), Some(REQUIRED_ERROR));
        assert_eq!(
            errors.to_json(),
            json!({ "discharge": { "criteria": "Field is required" } })
        );
    }

    #[test]
    fn test_sick_leave_dates_checked_only_when_included() {
        assert!(validate(&occupational(false, "", "not a date")).is_empty());

        let errors = validate(&occupational(true, "2019-08-05", ""));
        assert_eq!(errors.get(FieldPath::SickLeaveEndDate), Some(DATE_ERROR));
        assert!(!errors.contains(FieldPath::SickLeaveStartDate));
    }

    #[test]
    fn test_sick_leave_order_is_a_policy() {
        let state = occupational(true, "2019-08-28", "2019-08-05");
        assert!(validate(&state).is_empty());

        let errors = validate_with(&state, &FormConfig::new(false, true));
        assert_eq!(errors.get(FieldPath::SickLeaveEndDate), Some(SICK_LEAVE_ORDER_ERROR));
    }

    #[test]
    fn test_duplicate_diagnosis_codes_are_a_policy() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::HealthCheck(HealthCheckDraft::default()),
        };
        state.set_diagnosis_codes(vec!["M24.2".into(), "M24.2".into()]);
        assert!(validate(&state).is_empty());

        let errors = validate_with(&state, &FormConfig::new(true, false));
        assert_eq!(
            errors.get(FieldPath::DiagnosisCodes),
            Some(DUPLICATE_DIAGNOSIS_ERROR)
        );
    }

    #[test]
    fn test_health_check_rating_range() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::Unselected,
        };
        state.select_variant(EntryType::HealthCheck);
        for (rating, valid) in [(0.0, true), (3.0, true), (4.0, false), (-1.0, false), (1.5, false)] {
            state.variant = VariantDraft::HealthCheck(HealthCheckDraft {
                health_check_rating: rating,
            });
            assert_eq!(
                validate(&state).contains(FieldPath::HealthCheckRating),
                !valid,
                "rating {rating}"
            );
        }
    }

    #[test]
    fn test_to_json_groups_sick_leave_errors() {
        let mut state = occupational(true, "", "");
        state.base.description.clear();
        assert_eq!(
            validate(&state).to_json(),
            json!({
                "description": "Field is required",
                "sickLeave": { "startDate": "Invalid date", "endDate": "Invalid date" }
            })
        );
    }

    #[test]
    fn test_iter_is_in_display_order() {
        let errors = validate(&FormState::new());
        let paths: Vec<FieldPath> = errors.iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                FieldPath::EntryType,
                FieldPath::Description,
                FieldPath::Date,
                FieldPath::Specialist,
            ]
        );
    }
}
