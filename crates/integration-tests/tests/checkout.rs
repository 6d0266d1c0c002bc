//! Integration tests for checkout: order creation, collection and
//! server-side verification.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use royal_florist_core::{Address, CurrencyCode, PaymentId, Price, ProductId, ProfileUpdate};
use royal_florist_integration_tests::{KEY_ID, MockShop, signature};
use royal_florist_storefront::models::{PaymentAuthorization, PaymentOutcome, PaymentRequest};
use royal_florist_storefront::notify::NoticeLog;
use royal_florist_storefront::services::PaymentCollector;
use royal_florist_storefront::session::MemoryStorage;
use royal_florist_storefront::{Storefront, StorefrontError, ValidationError};

const EMAIL: &str = "ada@royal.com";

async fn signed_in() -> (MockShop, Storefront, NoticeLog) {
    let shop = MockShop::start().await.unwrap();
    shop.add_account("Ada", EMAIL, "secret1");
    let log = NoticeLog::new();
    let store = shop
        .connect(Arc::new(MemoryStorage::new()), Arc::new(log.clone()))
        .unwrap();
    store.auth().login_with_password(EMAIL, "secret1").await.unwrap();
    let _ = log.drain();
    (shop, store, log)
}

/// Answers like the gateway would, optionally with a forged signature.
#[derive(Default)]
struct GatewayCollector {
    outcome: Option<&'static str>,
    seen: Mutex<Vec<PaymentRequest>>,
}

impl GatewayCollector {
    fn answering(outcome: &'static str) -> Self {
        Self {
            outcome: Some(outcome),
            seen: Mutex::default(),
        }
    }

    fn requests(&self) -> Vec<PaymentRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl PaymentCollector for GatewayCollector {
    async fn collect(&self, request: PaymentRequest) -> PaymentOutcome {
        self.seen.lock().unwrap().push(request.clone());
        let payment_id = "pay_001";
        let signature = match self.outcome {
            None => signature(request.order_id.as_str(), payment_id),
            Some("cancel") => return PaymentOutcome::Cancelled,
            Some("fail") => {
                return PaymentOutcome::Failed {
                    description: Some("Card declined".to_string()),
                };
            }
            Some(other) => other.to_string(),
        };
        PaymentOutcome::Authorized(PaymentAuthorization {
            payment_id: PaymentId::new(payment_id),
            order_id: request.order_id,
            signature,
        })
    }
}

#[tokio::test]
async fn test_checkout_pays_and_empties_cart() {
    let (shop, store, log) = signed_in().await;
    let mut cart = store.cart();
    cart.add(&ProductId::new("p-red-roses")).await.unwrap();
    cart.add(&ProductId::new("p-red-roses")).await.unwrap();
    let _ = log.drain();
    let collector = GatewayCollector::default();

    let receipt = store.checkout().checkout(&mut cart, &collector).await.unwrap();

    assert_eq!(receipt.order_id.as_str(), "order_1");
    assert_eq!(receipt.payment_id.as_str(), "pay_001");
    assert_eq!(receipt.amount, Price::new(998.into()));
    assert_eq!(receipt.currency, CurrencyCode::INR);

    let requests = collector.requests();
    let request = requests.first().unwrap();
    assert_eq!(request.amount_minor, 99_800);
    assert_eq!(request.key_id, KEY_ID);
    assert_eq!(request.prefill.email, EMAIL);
    assert_eq!(request.prefill.name, "Ada");
    assert_eq!(request.merchant_name, "Flower Shop");

    assert_eq!(shop.paid_orders(), ["order_1"]);
    assert!(cart.cart().is_empty());
    assert_eq!(log.successes(), ["Payment successful!"]);

    let order = shop.last_order().unwrap();
    assert_eq!(order["addressDetails"]["city"], "Cuttack");
    assert_eq!(order["orderDetails"][0]["productId"], "p-red-roses");
    assert_eq!(order["currency"], "INR");
}

#[tokio::test]
async fn test_checkout_ships_to_profile_address() {
    let (shop, store, _log) = signed_in().await;
    store
        .profile()
        .update(&ProfileUpdate {
            phone: "9876543210".to_string(),
            address: Address {
                full_address: "12 Rose Lane".to_string(),
                city: "Bhubaneswar".to_string(),
                state: "Odisha".to_string(),
                pincode: "751001".to_string(),
                ..Address::default()
            },
        })
        .await
        .unwrap();
    let mut cart = store.cart();
    cart.add(&ProductId::new("p-lily-basket")).await.unwrap();
    let collector = GatewayCollector::default();

    store.checkout().checkout(&mut cart, &collector).await.unwrap();

    let order = shop.last_order().unwrap();
    assert_eq!(order["addressDetails"]["city"], "Bhubaneswar");
    assert_eq!(order["addressDetails"]["pincode"], "751001");
    assert_eq!(order["userDetails"]["phone"], "9876543210");
    assert_eq!(
        collector.requests().first().unwrap().prefill.contact.as_deref(),
        Some("9876543210")
    );
}

#[tokio::test]
async fn test_empty_cart_never_creates_order() {
    let (shop, store, log) = signed_in().await;
    let mut cart = store.cart();
    cart.load().await.unwrap();
    let collector = GatewayCollector::default();

    let err = store.checkout().checkout(&mut cart, &collector).await.unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::Validation(ValidationError::EmptyCart)
    ));
    assert!(collector.requests().is_empty());
    assert_eq!(shop.calls("POST /api/payments/razorpay/create-order"), 0);
    assert_eq!(log.errors(), ["Cart is empty"]);
}

#[tokio::test]
async fn test_cancelled_payment_keeps_cart() {
    let (shop, store, log) = signed_in().await;
    let mut cart = store.cart();
    cart.add(&ProductId::new("p-white-roses")).await.unwrap();
    let _ = log.drain();
    let collector = GatewayCollector::answering("cancel");

    let err = store.checkout().checkout(&mut cart, &collector).await.unwrap_err();

    assert!(matches!(err, StorefrontError::PaymentCancelled));
    assert_eq!(shop.calls("POST /api/payments/razorpay/verify"), 0);
    assert_eq!(cart.cart().items.len(), 1);
    assert_eq!(shop.cart_lines(EMAIL).len(), 1);
    assert_eq!(log.errors(), ["Payment cancelled"]);
}

#[tokio::test]
async fn test_gateway_failure_shows_description() {
    let (_shop, store, log) = signed_in().await;
    let mut cart = store.cart();
    cart.add(&ProductId::new("p-white-roses")).await.unwrap();
    let _ = log.drain();

    let err = store
        .checkout()
        .checkout(&mut cart, &GatewayCollector::answering("fail"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::PaymentFailed(_)));
    assert_eq!(log.errors(), ["Card declined"]);
}

#[tokio::test]
async fn test_forged_signature_is_rejected() {
    let (shop, store, log) = signed_in().await;
    let mut cart = store.cart();
    cart.add(&ProductId::new("p-white-roses")).await.unwrap();
    let _ = log.drain();

    let err = store
        .checkout()
        .checkout(&mut cart, &GatewayCollector::answering("forged"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::RemoteRejected { status: 400, .. }
    ));
    assert!(shop.paid_orders().is_empty());
    assert_eq!(cart.cart().items.len(), 1);
    assert_eq!(log.errors(), ["Invalid payment signature"]);
}
