//! Password sign-in, sign-out and the signed-in guard.
//!
//! Code-based sign-in lives in [`crate::services::otp`].

use royal_florist_core::{Email, User};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, instrument};

use crate::api::Endpoint;
use crate::error::{Result, StorefrontError, ValidationError};
use crate::navigation::Destination;
use crate::services::otp::SessionGrant;
use crate::state::Storefront;

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a Storefront,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a Storefront) -> Self {
        Self { store }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if either field is blank or the email is
    /// malformed (nothing is sent), or `RemoteRejected` for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login_with_password(&self, email: &str, password: &str) -> Result<Destination> {
        let result = self.try_login(email, password).await;
        self.store.report(result, "Authentication failed.")
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Destination> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        let email = Email::parse(email)?;

        let grant: SessionGrant = self
            .store
            .api()
            .call_with(
                Endpoint::PasswordLogin,
                &LoginBody {
                    email: email.as_str(),
                    password,
                },
            )
            .await?;

        self.store
            .session()
            .establish(grant.user, SecretString::from(grant.token))?;
        info!(email = %email, "Signed in with password");
        self.store.success("Logged in");
        Ok(Destination::Home)
    }

    /// Sign out, purging everything persisted on this device.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if persisted state cannot be removed. The in-memory
    /// session is cleared regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<Destination> {
        let result = self
            .store
            .session()
            .clear()
            .map(|()| Destination::SignIn)
            .map_err(StorefrontError::from);
        let result = self.store.report(result, "Logout failed");
        if result.is_ok() {
            info!("Signed out");
            self.store.success("Logged out");
        }
        result
    }

    /// The signed-in user, for operations that need one.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when nobody is signed in.
    pub fn require_auth(&self) -> Result<User> {
        let session = self.store.session();
        match (session.is_authenticated(), session.current_user()) {
            (true, Some(user)) => Ok(user),
            _ => Err(StorefrontError::Unauthenticated),
        }
    }
}
