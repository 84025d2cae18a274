//! Postal code (CEP) normalization.
//!
//! Callers may send a postal code with punctuation (`01310-100`); the stored
//! form is always the eight bare digits (`01310100`).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The normalized code does not have exactly [`PostalCode::LENGTH`] digits.
    #[error("postal code must contain exactly {expected} digits (got {actual})")]
    InvalidFormat {
        /// Required digit count.
        expected: usize,
        /// Digit count after normalization.
        actual: usize,
    },
}

/// Strip every non-digit character from a raw postal code.
///
/// Pure and idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// An eight-digit postal code in normalized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Exact number of digits in a postal code.
    pub const LENGTH: usize = 8;

    /// Validate an already-normalized postal code.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::InvalidFormat`] unless the input is exactly
    /// eight ASCII digits.
    pub fn validate(normalized: &str) -> Result<Self, PostalCodeError> {
        if normalized.len() != Self::LENGTH || !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PostalCodeError::InvalidFormat {
                expected: Self::LENGTH,
                actual: normalized.chars().count(),
            });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Normalize and validate a raw postal code.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::InvalidFormat`] if the input does not carry
    /// exactly eight digits.
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        Self::validate(&normalize(raw))
    }

    /// Returns the eight digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("01310-100"), "01310100");
        assert_eq!(normalize(" 01.310 100 "), "01310100");
        assert_eq!(normalize("abc"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["01310-100", "  ", "12a34b", "0000000000", "٣٤"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn test_parse_valid() {
        let code = PostalCode::parse("01310-100").unwrap();
        assert_eq!(code.as_str(), "01310100");
    }

    #[test]
    fn test_validate_rejects_short_and_long() {
        assert_eq!(
            PostalCode::validate("1234567"),
            Err(PostalCodeError::InvalidFormat {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(
            PostalCode::parse("123-456-789"),
            Err(PostalCodeError::InvalidFormat {
                expected: 8,
                actual: 9
            })
        );
    }

    #[test]
    fn test_validate_rejects_unnormalized_input() {
        assert!(PostalCode::validate("0131-0100").is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            PostalCode::parse(""),
            Err(PostalCodeError::InvalidFormat { actual: 0, .. })
        ));
    }
}
