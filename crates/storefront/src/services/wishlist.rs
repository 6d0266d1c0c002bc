//! Wishlist membership.
//!
//! Membership changes only after the server confirms. When a response
//! carries the full list it replaces the local one.

use std::collections::BTreeSet;

use royal_florist_core::ProductId;
use tracing::{debug, instrument};

use crate::api::Endpoint;
use crate::error::{Result, StorefrontError};
use crate::models::WishlistItem;
use crate::models::wishlist::{WishlistAddRequest, WishlistEnvelope};
use crate::state::Storefront;

/// The shopper's liked products.
#[derive(Debug)]
pub struct WishlistService {
    store: Storefront,
    items: Vec<WishlistItem>,
    liked: BTreeSet<ProductId>,
}

impl WishlistService {
    #[must_use]
    pub fn new(store: Storefront) -> Self {
        Self {
            store,
            items: Vec::new(),
            liked: BTreeSet::new(),
        }
    }

    /// Entries as last returned by the server.
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn is_liked(&self, product_id: &ProductId) -> bool {
        self.liked.contains(product_id)
    }

    /// Number of liked products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.liked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.liked.is_empty()
    }

    /// Fetch the wishlist. Signed out, this quietly yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error; the local list is emptied.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[WishlistItem]> {
        if !self.store.session().is_authenticated() {
            self.replace(Vec::new());
            return Ok(&self.items);
        }

        let result = self
            .store
            .api()
            .call::<WishlistEnvelope>(Endpoint::Wishlist)
            .await;
        match self.store.report(result, "Failed to load wishlist") {
            Ok(envelope) => {
                self.replace(envelope.items.unwrap_or_default());
                Ok(&self.items)
            }
            Err(e) => {
                self.replace(Vec::new());
                Err(e)
            }
        }
    }

    /// Like the product if it is not liked, unlike it otherwise.
    ///
    /// Returns the membership after the server confirmed the change.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out (nothing is sent), otherwise
    /// the transport or server error with membership unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&mut self, product_id: &ProductId) -> Result<bool> {
        if self.is_liked(product_id) {
            let result = self.try_remove(product_id).await;
            self.store.report(result, "Wishlist update failed")?;
            self.store.success("Removed from wishlist");
            Ok(false)
        } else {
            let result = self.try_add(product_id).await;
            self.store.report(result, "Wishlist update failed")?;
            self.store.success("Added to wishlist");
            Ok(true)
        }
    }

    /// Unlike a product.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, otherwise the transport or
    /// server error with membership unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        let result = self.try_remove(product_id).await;
        self.store.report(result, "Remove failed")?;
        self.store.success("Removed from wishlist");
        Ok(())
    }

    async fn try_add(&mut self, product_id: &ProductId) -> Result<()> {
        self.require_session()?;
        let envelope: WishlistEnvelope = self
            .store
            .api()
            .call_with(Endpoint::WishlistAdd, &WishlistAddRequest { product_id })
            .await?;

        if let Some(items) = envelope.items {
            self.replace(items);
        } else if self.liked.insert(product_id.clone()) {
            self.items.push(WishlistItem {
                product_id: product_id.clone(),
                name: None,
                image: None,
                price: None,
            });
        }
        Ok(())
    }

    async fn try_remove(&mut self, product_id: &ProductId) -> Result<()> {
        self.require_session()?;
        let envelope: WishlistEnvelope = self
            .store
            .api()
            .call(Endpoint::WishlistRemove(product_id.clone()))
            .await?;

        if let Some(items) = envelope.items {
            self.replace(items);
        } else {
            self.liked.remove(product_id);
            self.items.retain(|item| &item.product_id != product_id);
        }
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        if self.store.session().is_authenticated() {
            Ok(())
        } else {
            Err(StorefrontError::Unauthenticated)
        }
    }

    fn replace(&mut self, items: Vec<WishlistItem>) {
        self.liked = items.iter().map(|item| item.product_id.clone()).collect();
        self.items = items;
        debug!(count = self.liked.len(), "Wishlist replaced");
    }
}
