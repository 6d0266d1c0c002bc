//! Where the user should land after an operation.
//!
//! The storefront library never renders anything; it tells the front end
//! which surface comes next and leaves the actual navigation to it.

use royal_florist_core::FlowKind;

/// A surface the front end should move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The product listing.
    Home,
    /// The password sign-in form.
    SignIn,
    /// The first step of an OTP flow.
    FlowStart(FlowKind),
}

impl Destination {
    /// A route path suitable for logging or for a web front end.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::SignIn => "/login",
            Self::FlowStart(FlowKind::Register) => "/register",
            Self::FlowStart(FlowKind::Login) => "/login/send-otp",
            Self::FlowStart(FlowKind::ForgotPassword) => "/forgot",
        }
    }
}
