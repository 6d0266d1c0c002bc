//! Checkout: payment order, external collection, server-side verification.
//!
//! The payment widget is an external collaborator. It is modelled as one
//! awaited call on a [`PaymentCollector`] that ends authorized, cancelled or
//! failed. A checkout that fails at any step leaves the cart untouched; only
//! a verified payment reloads it.

use std::future::Future;

use royal_florist_core::User;
use tracing::{info, instrument, warn};

use crate::api::{Endpoint, Message};
use crate::error::{Result, StorefrontError, ValidationError};
use crate::models::{
    AddressDetails, Cart, CheckoutReceipt, CreateOrderRequest, OrderLine, PaymentOrder,
    PaymentOutcome, PaymentRequest, Prefill, UserDetails,
};
use crate::services::cart::CartService;
use crate::services::profile::ProfileService;
use crate::state::Storefront;

const ORDER_DESCRIPTION: &str = "Order Payment";

/// Collects a payment for a gateway order, e.g. by opening the gateway's
/// checkout widget.
pub trait PaymentCollector: Send + Sync {
    /// Present the payment and wait until the shopper finishes or gives up.
    fn collect(&self, request: PaymentRequest) -> impl Future<Output = PaymentOutcome> + Send;
}

/// Checkout operations.
pub struct CheckoutService<'a> {
    store: &'a Storefront,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(store: &'a Storefront) -> Self {
        Self { store }
    }

    /// Pay for the cart.
    ///
    /// # Errors
    ///
    /// - `Validation` (`EmptyCart`, `InvalidTotal`) before any call
    /// - `Unauthenticated` when signed out
    /// - `PaymentCancelled` / `PaymentFailed` from the collector
    /// - the transport or server error of any remote step
    #[instrument(skip(self, cart, collector))]
    pub async fn checkout<C>(&self, cart: &mut CartService, collector: &C) -> Result<CheckoutReceipt>
    where
        C: PaymentCollector,
    {
        let result = self.prepare(cart.cart()).await;
        let (order, request) = self.store.report(result, "Checkout failed")?;

        let outcome = collector.collect(request).await;
        let authorization = self.store.report(
            match outcome {
                PaymentOutcome::Authorized(authorization) => Ok(authorization),
                PaymentOutcome::Cancelled => Err(StorefrontError::PaymentCancelled),
                PaymentOutcome::Failed { description } => Err(StorefrontError::PaymentFailed(
                    description.unwrap_or_default(),
                )),
            },
            "Payment failed",
        )?;
        if authorization.order_id != order.order_id {
            warn!(
                expected = %order.order_id,
                received = %authorization.order_id,
                "Payment authorized for a different order id"
            );
        }

        let result = self
            .store
            .api()
            .call_with::<_, Message>(Endpoint::VerifyPayment, &authorization)
            .await;
        self.store.report(result, "Payment verification failed")?;

        info!(
            order_id = %order.order_id,
            payment_id = %authorization.payment_id,
            "Payment verified"
        );
        self.store.success("Payment successful!");

        if let Err(e) = cart.load().await {
            warn!(error = %e, "Cart reload after payment failed");
        }

        Ok(CheckoutReceipt {
            order_id: order.order_id,
            payment_id: authorization.payment_id,
            amount: order.total_amount,
            currency: order.currency,
        })
    }

    /// Validate the cart, fetch the profile and create the gateway order.
    async fn prepare(&self, cart: &Cart) -> Result<(PaymentOrder, PaymentRequest)> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        if !cart.total_price.is_positive() {
            return Err(ValidationError::InvalidTotal.into());
        }

        let user = ProfileService::new(self.store).load().await?;
        let body = self.order_request(cart, &user);

        let order: PaymentOrder = self
            .store
            .api()
            .call_with(Endpoint::CreatePaymentOrder, &body)
            .await?;
        info!(order_id = %order.order_id, total = %order.total_amount, "Payment order created");

        let amount_minor = order
            .total_amount
            .to_minor_units(order.currency)
            .ok_or_else(|| StorefrontError::Decode("order amount out of range".to_string()))?;

        let request = PaymentRequest {
            key_id: order.key_id.clone(),
            order_id: order.order_id.clone(),
            amount_minor,
            currency: order.currency,
            merchant_name: self.store.config().checkout.merchant_name.clone(),
            description: ORDER_DESCRIPTION.to_string(),
            prefill: Prefill {
                name: user.name.clone(),
                email: user.email.to_string(),
                contact: user.phone.clone(),
            },
        };
        Ok((order, request))
    }

    fn order_request(&self, cart: &Cart, user: &User) -> CreateOrderRequest {
        let checkout = &self.store.config().checkout;
        let address_details = match &user.address {
            Some(address) if address.has_shipping_region() => AddressDetails {
                pincode: address.pincode.clone(),
                city: address.city.clone(),
                state: address.state.clone(),
            },
            _ => AddressDetails {
                pincode: checkout.fallback_region.pincode.clone(),
                city: checkout.fallback_region.city.clone(),
                state: checkout.fallback_region.state.clone(),
            },
        };

        CreateOrderRequest {
            user_details: UserDetails {
                name: user.name.clone(),
                phone: user.phone.clone(),
                email: user.email.to_string(),
            },
            address_details,
            total_amount: cart.total_price,
            currency: checkout.currency,
            order_details: cart
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id.clone(),
                    name: item.product_name.clone(),
                    amount: item.item_total,
                })
                .collect(),
        }
    }
}
