//! Cart reconciliation.
//!
//! The server owns the cart. Every call replaces the local copy with the
//! cart the server returns; quantities and totals are never computed here.

use royal_florist_core::{CartAction, ProductId};
use tracing::{debug, instrument, warn};

use crate::api::Endpoint;
use crate::error::{Result, StorefrontError};
use crate::models::Cart;
use crate::models::cart::{CartEnvelope, CartLineRequest, CartUpdateRequest};
use crate::state::Storefront;

/// The shopper's cart and the operations on it.
#[derive(Debug)]
pub struct CartService {
    store: Storefront,
    cart: Cart,
}

impl CartService {
    /// An empty view; nothing is fetched until [`CartService::load`].
    #[must_use]
    pub fn new(store: Storefront) -> Self {
        Self {
            store,
            cart: Cart::default(),
        }
    }

    /// The cart as last returned by the server.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Fetch the server cart. A response without a cart means it is empty.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, otherwise the transport or
    /// server error. The local cart is left as it was.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&Cart> {
        let result = self.fetch().await;
        let cart = self.store.report(result, "Failed to load cart")?;
        self.replace(cart);
        Ok(&self.cart)
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when signed out, otherwise the transport or
    /// server error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&mut self, product_id: &ProductId) -> Result<&Cart> {
        let result = self.try_add(product_id).await;
        let (cart, msg) = self.store.report(result, "Add to cart failed")?;
        self.replace(cart);
        self.store.success(msg.unwrap_or_else(|| "Added to cart".to_string()));
        Ok(&self.cart)
    }

    async fn try_add(&self, product_id: &ProductId) -> Result<(Cart, Option<String>)> {
        self.require_session()?;
        let envelope: CartEnvelope = self
            .store
            .api()
            .call_with(Endpoint::CartAdd, &CartLineRequest { product_id })
            .await?;
        let cart = match envelope.cart {
            Some(cart) => cart,
            None => {
                debug!("Add response carried no cart, reloading");
                self.fetch().await?
            }
        };
        Ok((cart, envelope.msg.filter(|m| !m.trim().is_empty())))
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// See [`CartService::add`].
    pub async fn increment(&mut self, product_id: &ProductId) -> Result<&Cart> {
        self.update(product_id, CartAction::Inc).await
    }

    /// Remove one unit from a line. The server decides what happens at zero.
    ///
    /// # Errors
    ///
    /// See [`CartService::add`].
    pub async fn decrement(&mut self, product_id: &ProductId) -> Result<&Cart> {
        self.update(product_id, CartAction::Dec).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn update(&mut self, product_id: &ProductId, action: CartAction) -> Result<&Cart> {
        let result = self
            .mutate(
                Endpoint::CartUpdate,
                &CartUpdateRequest { product_id, action },
            )
            .await;
        let cart = self.store.report(result, "Update failed")?;
        self.replace(cart);
        Ok(&self.cart)
    }

    /// Drop a line entirely.
    ///
    /// # Errors
    ///
    /// See [`CartService::add`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<&Cart> {
        let result = self
            .mutate(Endpoint::CartRemove, &CartLineRequest { product_id })
            .await;
        let cart = self.store.report(result, "Remove failed")?;
        self.replace(cart);
        self.store.success("Removed");
        Ok(&self.cart)
    }

    async fn fetch(&self) -> Result<Cart> {
        self.require_session()?;
        let envelope: CartEnvelope = self.store.api().call(Endpoint::Cart).await?;
        Ok(envelope.cart.unwrap_or_default())
    }

    async fn mutate<B>(&self, endpoint: Endpoint, body: &B) -> Result<Cart>
    where
        B: serde::Serialize + Sync,
    {
        self.require_session()?;
        let envelope: CartEnvelope = self.store.api().call_with(endpoint, body).await?;
        envelope
            .cart
            .ok_or_else(|| StorefrontError::Decode("cart response without a cart".to_string()))
    }

    fn require_session(&self) -> Result<()> {
        if self.store.session().is_authenticated() {
            Ok(())
        } else {
            Err(StorefrontError::Unauthenticated)
        }
    }

    fn replace(&mut self, cart: Cart) {
        for line in cart.drifted_lines() {
            warn!(
                product_id = %line.product_id,
                unit_price = %line.unit_price,
                quantity = line.quantity,
                item_total = %line.item_total,
                "Server line total differs from unit price times quantity"
            );
        }
        debug!(
            lines = cart.items.len(),
            total = %cart.total_price,
            "Cart replaced"
        );
        self.cart = cart;
    }
}
