//! Wishlist entries.

use royal_florist_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A liked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

/// `{items}` envelope. Mutations may answer with only a `msg`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WishlistEnvelope {
    #[serde(default)]
    pub items: Option<Vec<WishlistItem>>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistAddRequest<'a> {
    pub product_id: &'a ProductId,
}
