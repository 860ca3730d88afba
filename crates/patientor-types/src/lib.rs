//! Validated primitive types shared by the Patientor crates.
//!
//! Form drafts hold raw user input as plain `String`s. Once a draft passes
//! validation, required text fields are carried as [`NonEmptyText`] so a
//! submitted entry can never contain a blank description, specialist, discharge
//! criteria or employer name.

use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction,
/// so `"  Dr Byte "` is stored as `"Dr Byte"` and `"   "` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns `true` if `input` would be accepted by [`NonEmptyText::new`].
    pub fn is_valid(input: &str) -> bool {
        !input.trim().is_empty()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyText> for String {
    fn from(value: NonEmptyText) -> Self {
        value.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  Dr Byte House \n").expect("should accept padded text");
        assert_eq!(text.as_str(), "Dr Byte House");
    }

    #[test]
    fn test_new_rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(" \t "), Err(TextError::Empty));
        assert!(!NonEmptyText::is_valid("   "));
        assert!(NonEmptyText::is_valid(" x "));
    }

    #[test]
    fn test_deserialize_rejects_blank_string() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"")
            .expect_err("blank string should not deserialize");
        assert!(err.to_string().contains("Text cannot be empty"));

        let ok: NonEmptyText = serde_json::from_str("\"Checkup\"").expect("should deserialize");
        assert_eq!(ok.to_string(), "Checkup");
        assert_eq!(
            serde_json::to_string(&ok).expect("should serialize"),
            "\"Checkup\""
        );
    }
}
