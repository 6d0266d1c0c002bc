//! New-password validation shared by registration and password reset.

use thiserror::Error;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a new password pair is refused before it reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Password or confirmation left blank.
    #[error("Fill all fields")]
    Empty,
    /// Confirmation differs from the password.
    #[error("Passwords do not match")]
    Mismatch,
    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {min} characters")]
    TooShort {
        /// Required minimum length.
        min: usize,
    },
}

/// Validate a password and its confirmation.
///
/// Checks run in a fixed order: blank fields, then mismatch, then length.
/// Passwords are compared verbatim; whitespace is significant.
///
/// # Errors
///
/// Returns the first [`PasswordError`] that applies.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password.is_empty() || confirm.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password != confirm {
        return Err(PasswordError::Mismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matching_pair_at_minimum_length() {
        assert_eq!(validate_new_password("petals", "petals"), Ok(()));
    }

    #[test]
    fn test_blank_fields() {
        assert_eq!(validate_new_password("", "petals"), Err(PasswordError::Empty));
        assert_eq!(validate_new_password("petals", ""), Err(PasswordError::Empty));
    }

    #[test]
    fn test_mismatch_reported_before_length() {
        assert_eq!(
            validate_new_password("abc", "abd"),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            validate_new_password("rose5", "rose5"),
            Err(PasswordError::TooShort { min: 6 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // five characters, ten bytes
        assert!(validate_new_password("ééééé", "ééééé").is_err());
        assert!(validate_new_password("éééééé", "éééééé").is_ok());
    }
}
