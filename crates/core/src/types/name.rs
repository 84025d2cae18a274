//! Customer display name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerNameError {
    /// The input is empty or only whitespace.
    #[error("name cannot be empty")]
    Empty,
    /// The trimmed input is shorter or longer than allowed.
    #[error("name must be between {min} and {max} characters")]
    Length {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than letters and spaces.
    #[error("name must contain only letters and spaces")]
    InvalidCharacters,
}

/// A customer's full name.
///
/// Stored trimmed. Accented letters are accepted (`João`, `Conceição`), digits
/// and punctuation are not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `CustomerName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not 3-100 characters
    /// long, or contains anything other than letters and spaces.
    pub fn parse(s: &str) -> Result<Self, CustomerNameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CustomerNameError::Empty);
        }

        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(CustomerNameError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_alphabetic() || c == ' ') {
            return Err(CustomerNameError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_accented_letters() {
        let name = CustomerName::parse("João da Conceição").unwrap();
        assert_eq!(name.as_str(), "João da Conceição");
    }

    #[test]
    fn test_parse_trims() {
        let name = CustomerName::parse("  Ana Lima  ").unwrap();
        assert_eq!(name.as_str(), "Ana Lima");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(CustomerName::parse("  "), Err(CustomerNameError::Empty));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            CustomerName::parse("Al"),
            Err(CustomerNameError::Length { .. })
        ));
        assert!(CustomerName::parse("Ana").is_ok());
        assert!(CustomerName::parse(&"a".repeat(100)).is_ok());
        assert!(matches!(
            CustomerName::parse(&"a".repeat(101)),
            Err(CustomerNameError::Length { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_digits_and_punctuation() {
        assert_eq!(
            CustomerName::parse("Agent 007"),
            Err(CustomerNameError::InvalidCharacters)
        );
        assert_eq!(
            CustomerName::parse("O'Brien"),
            Err(CustomerNameError::InvalidCharacters)
        );
    }
}
