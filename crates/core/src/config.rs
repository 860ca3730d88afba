//! Form configuration.
//!
//! Resolved once at process startup and passed into the controller. Nothing in
//! the core reads environment variables while the form is in use; hosts read
//! them at startup and parse them with [`flag_from_env_value`].

use crate::error::{FormError, FormResult};

/// Environment variable enabling [`FormConfig::reject_duplicate_diagnosis_codes`].
pub const REJECT_DUPLICATE_DIAGNOSES_ENV: &str = "PATIENTOR_REJECT_DUPLICATE_DIAGNOSES";

/// Environment variable enabling [`FormConfig::require_sick_leave_order`].
pub const REQUIRE_SICK_LEAVE_ORDER_ENV: &str = "PATIENTOR_REQUIRE_SICK_LEAVE_ORDER";

/// Optional validation policies. Both are off by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormConfig {
    reject_duplicate_diagnosis_codes: bool,
    require_sick_leave_order: bool,
}

impl FormConfig {
    pub fn new(reject_duplicate_diagnosis_codes: bool, require_sick_leave_order: bool) -> Self {
        Self {
            reject_duplicate_diagnosis_codes,
            require_sick_leave_order,
        }
    }

    /// Report an error under `diagnosisCodes` when a code is selected twice.
    pub fn reject_duplicate_diagnosis_codes(&self) -> bool {
        self.reject_duplicate_diagnosis_codes
    }

    /// Report an error under `sickLeave.endDate` when sick leave ends before it starts.
    pub fn require_sick_leave_order(&self) -> bool {
        self.require_sick_leave_order
    }
}

/// Parses a boolean flag from a raw environment value.
///
/// A missing or blank value means `false`. Accepted spellings are
/// `true`/`false`, `1`/`0` and `yes`/`no`, in any case.
///
/// # Errors
///
/// Returns [`FormError::InvalidConfig`] for any other value.
pub fn flag_from_env_value(key: &'static str, value: Option<String>) -> FormResult<bool> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        _ => Err(FormError::InvalidConfig { key, value: raw }),
    }
}
