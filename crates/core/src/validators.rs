//! Input validation predicates.
//!
//! Pure functions with no side effects. The `serde_json::Value` forms accept
//! whatever a host hands over (a string, a number, `null`, ...) and answer
//! `false` for anything of the wrong shape; the typed forms back them and are
//! what the rest of the crate uses.
//!
//! Dates are checked strictly: exactly `YYYY-MM-DD` with a four digit year and
//! two digit month and day, and the result must be a real calendar day. Inputs
//! such as `2024-1-05`, `2024-01-05T10:00` or `05/01/2024` are rejected.

use chrono::NaiveDate;
use serde_json::Value;

use crate::constants::DATE_FORMAT;
use crate::entry::HealthCheckRating;

/// Returns `true` if `value` is a string holding a valid `YYYY-MM-DD` calendar date.
pub fn is_valid_date(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_date_str)
}

/// Returns `true` if `value` is an integer in `0..=3`.
///
/// Numbers with a zero fractional part (`2.0`) count as integers; strings such
/// as `"1"` do not.
pub fn is_valid_health_check_rating(value: &Value) -> bool {
    value
        .as_f64()
        .and_then(HealthCheckRating::from_number)
        .is_some()
}

/// Typed form of [`is_valid_date`].
pub fn is_valid_date_str(input: &str) -> bool {
    parse_date(input).is_some()
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}
