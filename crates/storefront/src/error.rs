//! Unified error handling for storefront operations.
//!
//! Every operation returns `Result<T, StorefrontError>`. The four kinds a
//! user can meet are `Validation` (refused before any request),
//! `RemoteRejected` (the server said no), `Unauthenticated` (no usable
//! session) and `SubjectMissing` (an OTP flow lost its email). The remaining
//! variants are infrastructure failures that front ends show with a generic
//! message.

use royal_florist_core::{EmailError, FlowKind, OtpError, OtpStage, PasswordError, ProfileError};
use thiserror::Error;

use crate::navigation::Destination;
use crate::session::StorageError;

/// Input refused on the client, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// A required form field was blank.
    #[error("Fill all fields")]
    MissingField(&'static str),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid total")]
    InvalidTotal,
}

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Client-side validation failed; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The server answered with an error payload.
    #[error("Request rejected ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// No session, or the server refused the session token.
    #[error("Not signed in")]
    Unauthenticated,

    /// An OTP flow step ran without the email collected in its first step.
    #[error("Email missing. Please start the {0} again.")]
    SubjectMissing(FlowKind),

    /// An OTP flow step was invoked from the wrong stage.
    #[error("Cannot {action} while {stage}")]
    InvalidTransition {
        stage: OtpStage,
        action: &'static str,
    },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The shopper closed the payment widget.
    #[error("Payment cancelled")]
    PaymentCancelled,

    /// The payment gateway reported a failure.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
}

impl StorefrontError {
    /// Text to show the user, falling back to `fallback` for failures whose
    /// details are not meant for them.
    ///
    /// Server messages are shown verbatim.
    #[must_use]
    pub fn notice_text(&self, fallback: &str) -> String {
        match self {
            Self::RemoteRejected { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Validation(err) => err.to_string(),
            Self::Unauthenticated => "Please login first".to_string(),
            Self::SubjectMissing(_) | Self::PaymentCancelled => self.to_string(),
            Self::PaymentFailed(description) if !description.trim().is_empty() => {
                description.clone()
            }
            _ => fallback.to_string(),
        }
    }

    /// Where the user should be sent after this error, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<Destination> {
        match self {
            Self::Unauthenticated => Some(Destination::SignIn),
            Self::SubjectMissing(kind) => Some(Destination::FlowStart(*kind)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<EmailError> for StorefrontError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<PasswordError> for StorefrontError {
    fn from(err: PasswordError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<OtpError> for StorefrontError {
    fn from(err: OtpError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<ProfileError> for StorefrontError {
    fn from(err: ProfileError) -> Self {
        Self::Validation(err.into())
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_shown_verbatim() {
        let err = StorefrontError::RemoteRejected {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(
            err.notice_text("Registration request failed"),
            "Email already registered"
        );
    }

    #[test]
    fn test_blank_server_message_uses_fallback() {
        let err = StorefrontError::RemoteRejected {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.notice_text("Update failed"), "Update failed");
    }

    #[test]
    fn test_validation_message_wins_over_fallback() {
        let err = StorefrontError::from(PasswordError::Mismatch);
        assert_eq!(err.notice_text("Reset failed"), "Passwords do not match");
        assert!(err.is_validation());
    }

    #[test]
    fn test_infrastructure_errors_use_fallback() {
        let err = StorefrontError::Decode("missing field `cart`".to_string());
        assert_eq!(err.notice_text("Failed to load cart"), "Failed to load cart");
    }

    #[test]
    fn test_redirects() {
        assert_eq!(
            StorefrontError::Unauthenticated.redirect(),
            Some(Destination::SignIn)
        );
        assert_eq!(
            StorefrontError::SubjectMissing(FlowKind::ForgotPassword).redirect(),
            Some(Destination::FlowStart(FlowKind::ForgotPassword))
        );
        assert_eq!(StorefrontError::PaymentCancelled.redirect(), None);
    }
}
