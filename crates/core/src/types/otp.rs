//! One-time passcodes typed by the user.

use core::fmt;

use thiserror::Error;

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpError {
    /// Nothing was entered.
    #[error("Enter OTP")]
    Empty,
}

/// A one-time passcode as entered by the user.
///
/// The server owns the format (length, alphabet) and decides whether a code
/// is right; the client only refuses blank input.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parse a code from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::Empty` if the trimmed input is empty.
    pub fn parse(input: &str) -> Result<Self, OtpError> {
        let code = input.trim();
        if code.is_empty() {
            return Err(OtpError::Empty);
        }
        Ok(Self(code.to_owned()))
    }

    /// The code as sent to the server.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}
