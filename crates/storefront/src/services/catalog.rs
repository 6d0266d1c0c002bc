//! Public catalog: categories and products.

use royal_florist_core::CategoryId;
use tracing::{debug, instrument};

use crate::api::Endpoint;
use crate::error::Result;
use crate::models::catalog::Listing;
use crate::models::{Category, Product};
use crate::state::Storefront;

/// Which products to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => product.in_category(id),
        }
    }

    /// Keep the products this filter admits, in order.
    #[must_use]
    pub fn apply<'p>(&self, products: &'p [Product]) -> Vec<&'p Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Catalog reads. These calls need no session.
pub struct CatalogService<'a> {
    store: &'a Storefront,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a Storefront) -> Self {
        Self { store }
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error; a notice is raised.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let result = self
            .store
            .api()
            .call::<Listing<Category>>(Endpoint::Categories)
            .await
            .map(Listing::into_vec);
        if let Ok(categories) = &result {
            debug!(count = categories.len(), "Loaded categories");
        }
        self.store.report(result, "Failed to load categories")
    }

    /// Products admitted by `filter`.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error; a notice is raised.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &CategoryFilter) -> Result<Vec<Product>> {
        let result = self
            .store
            .api()
            .call::<Listing<Product>>(Endpoint::Products)
            .await
            .map(|listing| {
                let mut products = listing.into_vec();
                products.retain(|p| filter.matches(p));
                products
            });
        if let Ok(products) = &result {
            debug!(count = products.len(), "Loaded products");
        }
        self.store.report(result, "Failed to load products")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[
                {"_id":"p1","name":"Red Roses","price":499,"category":"roses"},
                {"_id":"p2","name":"Lily Basket","price":799,"category":{"_id":"lilies"}},
                {"_id":"p3","name":"Gift Card","price":100}
            ]"#,
        )
        .unwrap();

        assert_eq!(CategoryFilter::All.apply(&products).len(), 3);
        let lilies = CategoryFilter::Only(CategoryId::new("lilies")).apply(&products);
        assert_eq!(lilies.len(), 1);
        assert_eq!(lilies.first().map(|p| p.name.as_str()), Some("Lily Basket"));
    }
}
