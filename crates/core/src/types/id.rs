//! Newtype IDs for type-safe entity references.
//!
//! The shop API identifies everything with opaque string ids (document ids),
//! and returns references either as the bare id or as the populated document
//! (`{"_id": "...", "name": ...}`). Every id type defined with [`define_id!`]
//! accepts both shapes when deserializing and always serializes as the bare id.

use serde::Deserialize;

/// Wire shapes accepted for an id.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Plain(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl RawId {
    #[doc(hidden)]
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Plain(id) | Self::Populated { id } => id,
        }
    }
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as the bare string
/// - `Deserialize` from a bare string or a populated `{"_id": ...}` object
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `Display`, `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use royal_florist_core::define_id;
/// define_id!(BouquetId);
///
/// let id: BouquetId = serde_json::from_str(r#"{"_id": "b1", "name": "Roses"}"#).unwrap();
/// assert_eq!(id.as_str(), "b1");
/// assert_eq!(serde_json::to_string(&id).unwrap(), "\"b1\"");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(|raw| Self(raw.into_string()))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(PaymentOrderId);
define_id!(PaymentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_plain_id() {
        let id: ProductId = serde_json::from_str("\"65f0c1\"").unwrap();
        assert_eq!(id, ProductId::new("65f0c1"));
    }

    #[test]
    fn test_deserialize_populated_reference() {
        let id: CategoryId =
            serde_json::from_str(r#"{"_id": "cat-9", "name": "Lilies", "image": "x.png"}"#)
                .unwrap();
        assert_eq!(id.as_str(), "cat-9");
    }

    #[test]
    fn test_deserialize_populated_reference_with_plain_id_key() {
        let id: ProductId = serde_json::from_str(r#"{"id": "p-1"}"#).unwrap();
        assert_eq!(id.as_str(), "p-1");
    }

    #[test]
    fn test_rejects_non_id_shapes() {
        assert!(serde_json::from_str::<ProductId>("42").is_err());
        assert!(serde_json::from_str::<ProductId>(r#"{"name": "no id"}"#).is_err());
    }

    #[test]
    fn test_display_is_bare_id() {
        assert_eq!(UserId::from("u-7").to_string(), "u-7");
    }
}
