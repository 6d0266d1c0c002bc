//! State enums shared by the storefront flows.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The three OTP-backed account flows.
///
/// They share one challenge protocol and differ only in the endpoints they
/// call and in what happens once the challenge is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Create a new account.
    Register,
    /// Sign in with an emailed code instead of a password.
    Login,
    /// Reset a forgotten password.
    ForgotPassword,
}

impl FlowKind {
    /// All flow kinds, in menu order.
    pub const ALL: [Self; 3] = [Self::Register, Self::Login, Self::ForgotPassword];

    /// Whether the flow ends by setting a new password.
    #[must_use]
    pub const fn sets_password(self) -> bool {
        matches!(self, Self::Register | Self::ForgotPassword)
    }

    /// Whether the collection step asks for the account holder's name.
    #[must_use]
    pub const fn requires_name(self) -> bool {
        matches!(self, Self::Register)
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "registration",
            Self::Login => "login",
            Self::ForgotPassword => "password reset",
        })
    }
}

/// Position of an OTP challenge.
///
/// Stages only move forward after the matching server call succeeds; the
/// only backwards edge is returning to [`OtpStage::Collecting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpStage {
    /// Gathering identity fields; no code has been requested.
    #[default]
    Collecting,
    /// A code was sent to the subject email.
    AwaitingOtp,
    /// The code was accepted; waiting for the new password.
    Finalizing,
    /// Terminal: the account was created, the session established or the
    /// password reset.
    Completed,
}

impl fmt::Display for OtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collecting => "COLLECTING",
            Self::AwaitingOtp => "AWAITING_OTP",
            Self::Finalizing => "FINALIZING",
            Self::Completed => "COMPLETED",
        })
    }
}

/// Quantity change requested on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    /// Add one unit.
    Inc,
    /// Remove one unit.
    Dec,
}
