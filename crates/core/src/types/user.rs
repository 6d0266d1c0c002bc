//! Account holder profile as returned by the shop API.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::{Email, UserId};

/// Country assumed when the profile does not name one.
pub const DEFAULT_COUNTRY: &str = "India";

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-side account id.
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Login email.
    pub email: Email,
    /// Contact number, used to prefill the payment widget.
    #[serde(default)]
    pub phone: Option<String>,
    /// Delivery address.
    #[serde(default)]
    pub address: Option<Address>,
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// House number, street and area.
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pincode: String,
    #[serde(default = "default_country", deserialize_with = "null_as_country")]
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            full_address: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            country: default_country(),
        }
    }
}

impl Address {
    /// Whether pincode, city and state are all filled in.
    #[must_use]
    pub fn has_shipping_region(&self) -> bool {
        [&self.pincode, &self.city, &self.state]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// A required profile field was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is required")]
pub struct ProfileError(pub &'static str);

/// The editable part of a profile.
///
/// Name and email are fixed at registration; only contact details change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub phone: String,
    pub address: Address,
}

impl ProfileUpdate {
    /// Check that every field the profile form marks as required is filled.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let required = [
            ("Phone number", &self.phone),
            ("Full address", &self.address.full_address),
            ("Pin code", &self.address.pincode),
            ("City", &self.address.city),
            ("State", &self.address.state),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(ProfileError(label));
            }
        }
        Ok(())
    }

    /// Apply this update to a user record.
    pub fn apply_to(&self, user: &mut User) {
        user.phone = Some(self.phone.clone());
        user.address = Some(self.address.clone());
    }
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_owned()
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_country<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|country| country.filter(|c| !c.trim().is_empty()).unwrap_or_else(default_country))
}
