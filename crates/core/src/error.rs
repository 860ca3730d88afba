use crate::entry::EntryType;
use crate::fields::{FieldKind, FieldPath};

/// Errors returned when the form is driven in a way its current state does not allow.
///
/// None of these are validation failures: those are reported as
/// [`FieldErrors`](crate::validation::FieldErrors) and never as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown field path: {0}")]
    UnknownField(String),
    #[error("field {path} does not exist while the form is {state}")]
    FieldNotInVariant { path: FieldPath, state: &'static str },
    #[error("field {path} expects a {expected} value")]
    ValueKindMismatch { path: FieldPath, expected: FieldKind },
    #[error("field {0} is changed through its own binding, not set_field")]
    NotSettable(FieldPath),
    #[error("sick leave can only be toggled on an occupational healthcare entry")]
    SickLeaveToggleUnavailable,
    #[error("unknown entry type: {0}")]
    UnknownEntryType(String),
    #[error("the form is closed")]
    Closed,
    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },
}

pub type FormResult<T> = std::result::Result<T, FormError>;

/// Errors reported by the external submit callback.
///
/// Both variants are surfaced as a single form-level message; entered data is
/// kept so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The API rejected the entry with a message.
    #[error("{0}")]
    Rejected(String),
    /// The API answered with something that is not an entry, or not the entry that was sent.
    #[error("unexpected response from server: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    /// Shorthand for a response whose variant does not match the submitted payload.
    pub(crate) fn variant_mismatch(sent: EntryType, received: EntryType) -> Self {
        Self::MalformedResponse(format!(
            "submitted a {} entry but received a {} entry",
            sent.as_str(),
            received.as_str()
        ))
    }
}
