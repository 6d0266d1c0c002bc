//! Catalog records: categories and products.

use royal_florist_core::{CategoryId, Price, ProductId};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    /// Icon URL.
    #[serde(default, alias = "image")]
    pub icon: Option<String>,
}

/// A product listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Owning category, sent either as an id or as the populated record.
    #[serde(default)]
    pub category: Option<CategoryId>,
}

impl Product {
    /// Whether this product belongs to `category`.
    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category.as_ref() == Some(category)
    }
}

/// Listing responses come wrapped (`{"products": [...]}`) or as a bare
/// array; any other shape reads as an empty list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Categories { categories: Vec<T> },
    Products { products: Vec<T> },
    Bare(Vec<T>),
    Other(IgnoredAny),
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Categories { categories: items }
            | Self::Products { products: items }
            | Self::Bare(items) => items,
            Self::Other(_) => Vec::new(),
        }
    }
}
