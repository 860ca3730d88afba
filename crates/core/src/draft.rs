//! Form state of the add-entry form.
//!
//! The state is split into the fields every entry has ([`BaseDraft`]) and a sum
//! type over the variant-specific fields ([`VariantDraft`]). Because the common
//! fields live outside the enum, a variant switch only has to replace
//! `variant`. The previous variant's fields go away with its enum value, so no
//! stale cross-variant field can survive.
//!
//! Drafts hold raw user input. Nothing here is validated; see
//! [`validation`](crate::validation) for the rules and [`FormState::normalize`]
//! for turning a valid draft into a [`NewEntry`].

use patientor_types::NonEmptyText;

use crate::entry::{
    Discharge, EntryDetails, EntryType, HealthCheckRating, NewEntry, SickLeave,
};
use crate::error::{FormError, FormResult};
use crate::validators::parse_date;

/// Fields shared by every entry variant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseDraft {
    pub description: String,
    pub date: String,
    pub specialist: String,
    /// Selected codes in the order the user picked them.
    pub diagnosis_codes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DischargeDraft {
    pub date: String,
    pub criteria: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SickLeaveDraft {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HospitalDraft {
    pub discharge: DischargeDraft,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupationalDraft {
    pub employer_name: String,
    /// Transient UI flag. Never part of a submitted entry.
    pub include_sick_leave: bool,
    /// Kept while the flag is off so toggling back on restores the input.
    pub sick_leave: SickLeaveDraft,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HealthCheckDraft {
    /// Raw number input; only whole numbers in `0..=3` are valid.
    pub health_check_rating: f64,
}

/// Variant-specific fields, present only for the selected variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VariantDraft {
    /// No variant picked yet. Only valid before the first pick.
    #[default]
    Unselected,
    Hospital(HospitalDraft),
    OccupationalHealthcare(OccupationalDraft),
    HealthCheck(HealthCheckDraft),
}

impl VariantDraft {
    /// Fresh fields for `entry_type`, all empty or zero.
    pub fn defaults_for(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Hospital => VariantDraft::Hospital(HospitalDraft::default()),
            EntryType::OccupationalHealthcare => {
                VariantDraft::OccupationalHealthcare(OccupationalDraft::default())
            }
            EntryType::HealthCheck => VariantDraft::HealthCheck(HealthCheckDraft::default()),
        }
    }

    pub fn entry_type(&self) -> Option<EntryType> {
        match self {
            VariantDraft::Unselected => None,
            VariantDraft::Hospital(_) => Some(EntryType::Hospital),
            VariantDraft::OccupationalHealthcare(_) => Some(EntryType::OccupationalHealthcare),
            VariantDraft::HealthCheck(_) => Some(EntryType::HealthCheck),
        }
    }

    /// Short description used in error messages.
    pub fn state_name(&self) -> &'static str {
        match self {
            VariantDraft::Unselected => "unselected",
            VariantDraft::Hospital(_) => "a hospital draft",
            VariantDraft::OccupationalHealthcare(_) => "an occupational healthcare draft",
            VariantDraft::HealthCheck(_) => "a health check draft",
        }
    }
}

/// Complete state of an open add-entry form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub base: BaseDraft,
    pub variant: VariantDraft,
}

impl FormState {
    /// The initial state: no variant, empty common fields.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_type(&self) -> Option<EntryType> {
        self.variant.entry_type()
    }

    pub fn is_unselected(&self) -> bool {
        matches!(self.variant, VariantDraft::Unselected)
    }

    /// Switches to `target`, keeping the common fields and rebuilding the variant fields.
    ///
    /// Re-selecting the active variant also resets its fields.
    pub fn select_variant(&mut self, target: EntryType) {
        self.variant = VariantDraft::defaults_for(target);
    }

    /// Sets the transient sick-leave flag without touching the entered dates.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SickLeaveToggleUnavailable`] unless the occupational
    /// healthcare variant is selected.
    pub fn set_include_sick_leave(&mut self, include: bool) -> FormResult<()> {
        match &mut self.variant {
            VariantDraft::OccupationalHealthcare(draft) => {
                draft.include_sick_leave = include;
                Ok(())
            }
            _ => Err(FormError::SickLeaveToggleUnavailable),
        }
    }

    /// Replaces the whole diagnosis selection, keeping the given order.
    pub fn set_diagnosis_codes(&mut self, codes: Vec<String>) {
        self.base.diagnosis_codes = codes;
    }

    /// Builds the submit payload from this draft.
    ///
    /// The `includeSickLeave` flag is dropped, and the sick-leave record is only
    /// included while the flag is set. Returns `None` if any field needed by
    /// the selected variant does not parse, or no variant is selected; callers
    /// run [`validate`](crate::validation::validate) first to learn why.
    pub fn normalize(&self) -> Option<NewEntry> {
        let details = match &self.variant {
            VariantDraft::Unselected => return None,
            VariantDraft::Hospital(draft) => EntryDetails::Hospital {
                discharge: Discharge {
                    date: parse_date(&draft.discharge.date)?,
                    criteria: NonEmptyText::new(&draft.discharge.criteria).ok()?,
                },
            },
            VariantDraft::OccupationalHealthcare(draft) => {
                let sick_leave = if draft.include_sick_leave {
                    Some(SickLeave {
                        start_date: parse_date(&draft.sick_leave.start_date)?,
                        end_date: parse_date(&draft.sick_leave.end_date)?,
                    })
                } else {
                    None
                };
                EntryDetails::OccupationalHealthcare {
                    employer_name: NonEmptyText::new(&draft.employer_name).ok()?,
                    sick_leave,
                }
            }
            VariantDraft::HealthCheck(draft) => EntryDetails::HealthCheck {
                health_check_rating: HealthCheckRating::from_number(draft.health_check_rating)?,
            },
        };

        Some(NewEntry {
            description: NonEmptyText::new(&self.base.description).ok()?,
            date: parse_date(&self.base.date)?,
            specialist: NonEmptyText::new(&self.base.specialist).ok()?,
            diagnosis_codes: self.base.diagnosis_codes.clone(),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filled_base() -> BaseDraft {
        BaseDraft {
            description: "Yearly control visit".into(),
            date: "2019-10-20".into(),
            specialist: "MD House".into(),
            diagnosis_codes: vec!["Z57.1".into(), "M51.2".into()],
        }
    }

    #[test]
    fn test_new_state_is_unselected_and_empty() {
        let state = FormState::new();
        assert!(state.is_unselected());
        assert_eq!(state.entry_type(), None);
        assert_eq!(state.base, BaseDraft::default());
        assert!(state.base.diagnosis_codes.is_empty());
    }

    #[test]
    fn test_select_variant_initialises_documented_defaults() {
        let mut state = FormState::new();

        state.select_variant(EntryType::Hospital);
        assert_eq!(
            state.variant,
            VariantDraft::Hospital(HospitalDraft {
                discharge: DischargeDraft {
                    date: String::new(),
                    criteria: String::new(),
                }
            })
        );

        state.select_variant(EntryType::OccupationalHealthcare);
        assert_eq!(
            state.variant,
            VariantDraft::OccupationalHealthcare(OccupationalDraft {
                employer_name: String::new(),
                include_sick_leave: false,
                sick_leave: SickLeaveDraft::default(),
            })
        );

        state.select_variant(EntryType::HealthCheck);
        assert_eq!(
            state.variant,
            VariantDraft::HealthCheck(HealthCheckDraft {
                health_check_rating: 0.0
            })
        );
    }

    #[test]
    fn test_select_variant_keeps_common_fields_and_drops_old_variant_fields() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::Hospital(HospitalDraft {
                discharge: DischargeDraft {
                    date: "2019-10-25".into(),
                    criteria: "Healed".into(),
                },
            }),
        };

        state.select_variant(EntryType::HealthCheck);
        assert_eq!(state.base, filled_base());
        assert_eq!(
            state.variant,
            VariantDraft::HealthCheck(HealthCheckDraft::default())
        );

        state.select_variant(EntryType::Hospital);
        assert_eq!(
            state.variant,
            VariantDraft::Hospital(HospitalDraft::default()),
            "discharge input typed before the switch must not come back"
        );
    }

    #[test]
    fn test_reselecting_active_variant_resets_its_fields() {
        let mut state = FormState::new();
        state.select_variant(EntryType::OccupationalHealthcare);
        if let VariantDraft::OccupationalHealthcare(draft) = &mut state.variant {
            draft.employer_name = "HyPD".into();
            draft.include_sick_leave = true;
        }

        state.select_variant(EntryType::OccupationalHealthcare);
        assert_eq!(
            state.variant,
            VariantDraft::OccupationalHealthcare(OccupationalDraft::default())
        );
    }

    #[test]
    fn test_set_include_sick_leave_requires_occupational_variant() {
        let mut state = FormState::new();
        assert_eq!(
            state.set_include_sick_leave(true),
            Err(FormError::SickLeaveToggleUnavailable)
        );

        state.select_variant(EntryType::HealthCheck);
        assert_eq!(
            state.set_include_sick_leave(true),
            Err(FormError::SickLeaveToggleUnavailable)
        );
    }

    #[test]
    fn test_toggling_sick_leave_keeps_entered_dates() {
        let mut state = FormState::new();
        state.select_variant(EntryType::OccupationalHealthcare);
        state.set_include_sick_leave(true).expect("toggle on");
        if let VariantDraft::OccupationalHealthcare(draft) = &mut state.variant {
            draft.sick_leave.start_date = "2019-08-05".into();
        }

        state.set_include_sick_leave(false).expect("toggle off");
        state.set_include_sick_leave(true).expect("toggle on again");

        match &state.variant {
            VariantDraft::OccupationalHealthcare(draft) => {
                assert_eq!(draft.sick_leave.start_date, "2019-08-05");
            }
            other => panic!("expected occupational draft, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_drops_sick_leave_when_flag_is_off() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::OccupationalHealthcare(OccupationalDraft {
                employer_name: "HyPD".into(),
                include_sick_leave: false,
                sick_leave: SickLeaveDraft {
                    start_date: "2019-08-05".into(),
                    end_date: "2019-08-28".into(),
                },
            }),
        };

        let payload = state.normalize().expect("valid draft should normalize");
        assert_eq!(
            payload.details,
            EntryDetails::OccupationalHealthcare {
                employer_name: NonEmptyText::new("HyPD").unwrap(),
                sick_leave: None,
            }
        );

        state.set_include_sick_leave(true).expect("toggle on");
        let payload = state.normalize().expect("valid draft should normalize");
        match payload.details {
            EntryDetails::OccupationalHealthcare { sick_leave, .. } => {
                let sick_leave = sick_leave.expect("sick leave included");
                assert_eq!(
                    sick_leave.end_date,
                    NaiveDate::from_ymd_opt(2019, 8, 28).unwrap()
                );
            }
            other => panic!("expected occupational details, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_keeps_diagnosis_order_and_trims_text() {
        let mut state = FormState {
            base: filled_base(),
            variant: VariantDraft::HealthCheck(HealthCheckDraft {
                health_check_rating: 2.0,
            }),
        };
        state.base.specialist = "  MD House  ".into();

        let payload = state.normalize().expect("valid draft should normalize");
        assert_eq!(payload.diagnosis_codes, vec!["Z57.1", "M51.2"]);
        assert_eq!(payload.specialist.as_str(), "MD House");
        assert_eq!(
            payload.details,
            EntryDetails::HealthCheck {
                health_check_rating: HealthCheckRating::HighRisk
            }
        );
    }

    #[test]
    fn test_normalize_rejects_unselected_and_invalid_drafts() {
        let state = FormState {
            base: filled_base(),
            variant: VariantDraft::Unselected,
        };
        assert!(state.normalize().is_none());

        let state = FormState {
            base: filled_base(),
            variant: VariantDraft::Hospital(HospitalDraft {
                discharge: DischargeDraft {
                    date: "2019-10-25".into(),
                    criteria: String::new(),
                },
            }),
        };
        assert!(state.normalize().is_none());
    }
}
