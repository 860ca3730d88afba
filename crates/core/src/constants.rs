//! Constants used throughout the Patientor core crate.
//!
//! Validation messages and rating bounds live here so the validators, the
//! field descriptors and the tests all agree on the same values.

/// Message for a required field that was left empty.
pub const REQUIRED_ERROR: &str = "Field is required";

/// Message for a date field that is missing or not a strict `YYYY-MM-DD` date.
pub const DATE_ERROR: &str = "Invalid date";

/// Message for a health check rating outside the enumerated range.
pub const RATING_ERROR: &str = "Not valid health check rating";

/// Message reported under `type` while no entry variant has been picked.
pub const TYPE_REQUIRED_ERROR: &str = "Entry type is required";

/// Message for a repeated diagnosis code when duplicates are rejected.
pub const DUPLICATE_DIAGNOSIS_ERROR: &str = "Diagnosis codes must be unique";

/// Message for a sick leave that ends before it starts when ordering is enforced.
pub const SICK_LEAVE_ORDER_ERROR: &str = "Sick leave cannot end before it starts";

/// `chrono` format string for entry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder shown in every date input.
pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Lowest health check rating (`Healthy`).
pub const MIN_HEALTH_CHECK_RATING: u8 = 0;

/// Highest health check rating (`CriticalRisk`).
pub const MAX_HEALTH_CHECK_RATING: u8 = 3;
