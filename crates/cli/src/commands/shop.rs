//! Shopping commands: catalog, cart, wishlist, checkout.

use royal_florist_core::{CategoryId, PaymentId, ProductId};
use royal_florist_storefront::Storefront;
use royal_florist_storefront::models::{PaymentAuthorization, PaymentOutcome, PaymentRequest};
use royal_florist_storefront::services::{CategoryFilter, PaymentCollector};

use super::CmdResult;
use crate::console;
use crate::prompt::Prompt;

pub async fn categories(store: &Storefront) -> CmdResult {
    console::categories(&store.catalog().categories().await?);
    Ok(())
}

pub async fn products(store: &Storefront, category: Option<String>) -> CmdResult {
    let filter = category.map_or(CategoryFilter::All, |id| {
        CategoryFilter::Only(CategoryId::new(id))
    });
    let products = store.catalog().products(&filter).await?;
    console::products(&products, store.config().checkout.currency);
    Ok(())
}

pub async fn show_cart(store: &Storefront) -> CmdResult {
    let mut cart = store.cart();
    console::cart(cart.load().await?, store.config().checkout.currency);
    Ok(())
}

pub async fn add_to_cart(store: &Storefront, product_id: &str) -> CmdResult {
    let mut cart = store.cart();
    let id = ProductId::new(product_id);
    console::cart(cart.add(&id).await?, store.config().checkout.currency);
    Ok(())
}

pub async fn increment(store: &Storefront, product_id: &str) -> CmdResult {
    let mut cart = store.cart();
    let id = ProductId::new(product_id);
    console::cart(cart.increment(&id).await?, store.config().checkout.currency);
    Ok(())
}

pub async fn decrement(store: &Storefront, product_id: &str) -> CmdResult {
    let mut cart = store.cart();
    let id = ProductId::new(product_id);
    console::cart(cart.decrement(&id).await?, store.config().checkout.currency);
    Ok(())
}

pub async fn remove_from_cart(store: &Storefront, product_id: &str) -> CmdResult {
    let mut cart = store.cart();
    let id = ProductId::new(product_id);
    console::cart(cart.remove(&id).await?, store.config().checkout.currency);
    Ok(())
}

pub async fn show_wishlist(store: &Storefront) -> CmdResult {
    let mut wishlist = store.wishlist();
    if !store.session().is_authenticated() {
        console::line("Sign in to see your wishlist.");
        return Ok(());
    }
    console::wishlist(wishlist.load().await?, store.config().checkout.currency);
    Ok(())
}

pub async fn toggle_wishlist(store: &Storefront, product_id: &str) -> CmdResult {
    let mut wishlist = store.wishlist();
    wishlist.load().await?;
    wishlist.toggle(&ProductId::new(product_id)).await?;
    Ok(())
}

pub async fn remove_from_wishlist(store: &Storefront, product_id: &str) -> CmdResult {
    let mut wishlist = store.wishlist();
    wishlist.remove(&ProductId::new(product_id)).await?;
    Ok(())
}

pub async fn checkout(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let mut cart = store.cart();
    cart.load().await?;
    console::cart(cart.cart(), store.config().checkout.currency);

    let collector = PromptCollector { prompt };
    let receipt = store.checkout().checkout(&mut cart, &collector).await?;
    console::receipt(&receipt);
    Ok(())
}

/// Collects payment by showing the order and reading the gateway's answer
/// from the terminal.
struct PromptCollector<'a> {
    prompt: &'a Prompt,
}

impl PaymentCollector for PromptCollector<'_> {
    async fn collect(&self, request: PaymentRequest) -> PaymentOutcome {
        console::line(&format!(
            "{}: {} - pay {} {} (minor units) for order {} with key {}",
            request.merchant_name,
            request.description,
            request.amount_minor,
            request.currency,
            request.order_id,
            request.key_id
        ));

        let Ok(payment_id) = self.prompt.ask("Payment id (blank to cancel)").await else {
            return PaymentOutcome::Cancelled;
        };
        if payment_id.trim().is_empty() {
            return PaymentOutcome::Cancelled;
        }
        let Ok(signature) = self.prompt.ask("Signature").await else {
            return PaymentOutcome::Cancelled;
        };
        if signature.trim().is_empty() {
            return PaymentOutcome::Failed {
                description: Some("No signature provided".to_string()),
            };
        }

        PaymentOutcome::Authorized(PaymentAuthorization {
            payment_id: PaymentId::new(payment_id.trim()),
            order_id: request.order_id,
            signature: signature.trim().to_string(),
        })
    }
}
