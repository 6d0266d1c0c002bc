//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty (after trimming).
    #[error("Please provide email")]
    Empty,
    /// The input is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The input contains more than one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MultipleAtSymbols,
    /// The input contains whitespace between characters.
    #[error("email cannot contain spaces")]
    ContainsWhitespace,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address identifying a florist account.
///
/// The email is the subject of every OTP challenge, so it is parsed once when
/// the user submits a form and carried around as this type afterwards.
/// Surrounding whitespace is trimmed; case is preserved because the shop API
/// compares addresses verbatim.
///
/// ## Examples
///
/// ```
/// use royal_florist_core::Email;
///
/// assert_eq!(Email::parse("  a@b.com ").unwrap().as_str(), "a@b.com");
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("rose@@garden.com").is_err());
/// assert!(Email::parse("rose garden@shop.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address, in characters.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first structural problem found.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let email = Email::parse("\ta@b.com  ").unwrap();
        assert_eq!(email.as_str(), "a@b.com");
    }

    #[test]
    fn test_parse_preserves_case() {
        let email = Email::parse("Rose@Garden.com").unwrap();
        assert_eq!(email.as_str(), "Rose@Garden.com");
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_structural_problems() {
        assert_eq!(Email::parse("tulip"), Err(EmailError::MissingAtSymbol));
        assert_eq!(
            Email::parse("tulip@@shop.com"),
            Err(EmailError::MultipleAtSymbols)
        );
        assert_eq!(
            Email::parse("tu lip@shop.com"),
            Err(EmailError::ContainsWhitespace)
        );
        assert_eq!(Email::parse("@shop.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("tulip@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let fits = format!("{}@royal.com", "é".repeat(200));
        assert!(fits.len() > Email::MAX_LENGTH);
        assert!(Email::parse(&fits).is_ok());

        let over = format!("{}@x.in", "é".repeat(250));
        assert_eq!(over.chars().count(), 255);
        assert_eq!(
            Email::parse(&over),
            Err(EmailError::TooLong { max: 254 })
        );
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("orchid@royal.com").unwrap();
        assert_eq!(email.domain(), "royal.com");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("orchid@royal.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"orchid@royal.com\""
        );
    }
}
