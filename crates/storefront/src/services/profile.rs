//! The signed-in customer's profile.

use royal_florist_core::{ProfileUpdate, User};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::api::Endpoint;
use crate::error::{Result, StorefrontError};
use crate::state::Storefront;

#[derive(Deserialize)]
struct ProfileEnvelope {
    #[serde(default)]
    user: Option<User>,
}

/// Profile reads and edits.
pub struct ProfileService<'a> {
    store: &'a Storefront,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(store: &'a Storefront) -> Self {
        Self { store }
    }

    /// Fetch the profile and refresh the session user.
    ///
    /// A failed fetch proves the session unusable: it is cleared and the
    /// caller should send the user to sign in.
    ///
    /// # Errors
    ///
    /// Always `Unauthenticated` on failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<User> {
        let result = match self.load().await {
            Ok(user) => self
                .store
                .session()
                .update_user(user.clone())
                .map(|()| user),
            Err(e) => Err(e),
        };

        let result = result.map_err(|e| {
            warn!(error = %e, "Profile fetch failed, ending session");
            if let Err(e) = self.store.session().clear() {
                warn!(error = %e, "Failed to purge session");
            }
            StorefrontError::Unauthenticated
        });
        self.store.report(result, "Please login first")
    }

    /// Fetch the profile without touching the session.
    pub(crate) async fn load(&self) -> Result<User> {
        if !self.store.session().is_authenticated() {
            return Err(StorefrontError::Unauthenticated);
        }
        let envelope: ProfileEnvelope = self.store.api().call(Endpoint::Profile).await?;
        envelope
            .user
            .ok_or_else(|| StorefrontError::Decode("profile response without a user".to_string()))
    }

    /// Save contact details.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first blank required field (nothing is
    /// sent), `Unauthenticated` when signed out, or the server error.
    #[instrument(skip(self, update))]
    pub async fn update(&self, update: &ProfileUpdate) -> Result<User> {
        let result = self.try_update(update).await;
        let user = self.store.report(result, "Update failed")?;
        info!(user_id = %user.id, "Profile updated");
        self.store.success("Profile updated successfully");
        Ok(user)
    }

    async fn try_update(&self, update: &ProfileUpdate) -> Result<User> {
        update.validate()?;
        let mut user = self
            .store
            .session()
            .current_user()
            .ok_or(StorefrontError::Unauthenticated)?;

        let envelope: ProfileEnvelope = self
            .store
            .api()
            .call_with(Endpoint::ProfileUpdate, update)
            .await?;

        match envelope.user {
            Some(updated) => user = updated,
            None => update.apply_to(&mut user),
        }
        self.store.session().update_user(user.clone())?;
        Ok(user)
    }
}
