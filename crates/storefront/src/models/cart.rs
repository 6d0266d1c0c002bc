//! The server-owned cart.
//!
//! Totals are computed by the server and never recomputed here. A line whose
//! `itemTotal` differs from `unitPrice × quantity` is reported, not fixed.

use royal_florist_core::{CartAction, Price, ProductId};
use serde::{Deserialize, Serialize};

/// The shopper's cart as last returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Price,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default, alias = "name")]
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub item_total: Price,
}

impl CartItem {
    /// Whether the server's line total equals unit price times quantity.
    ///
    /// A product that overflows counts as inconsistent.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.unit_price.checked_mul(self.quantity) == Some(self.item_total)
    }
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Lines whose total disagrees with their unit price and quantity.
    pub fn drifted_lines(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|item| !item.is_consistent())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }
}

/// `{cart}` envelope returned by every cart endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CartEnvelope {
    #[serde(default)]
    pub cart: Option<Cart>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineRequest<'a> {
    pub product_id: &'a ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartUpdateRequest<'a> {
    pub product_id: &'a ProductId,
    pub action: CartAction,
}
