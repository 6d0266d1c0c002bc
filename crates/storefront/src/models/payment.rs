//! Payment order and verification payloads.

use royal_florist_core::{CurrencyCode, PaymentId, PaymentOrderId, Price, ProductId};
use serde::{Deserialize, Serialize};

/// Body of the create-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_details: UserDetails,
    pub address_details: AddressDetails,
    pub total_amount: Price,
    pub currency: CurrencyCode,
    pub order_details: Vec<OrderLine>,
}

/// Contact details of the paying customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressDetails {
    pub pincode: String,
    pub city: String,
    pub state: String,
}

/// One cart line as the payment order records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub amount: Price,
}

/// The gateway order created by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: PaymentOrderId,
    /// Public key the payment widget is opened with.
    pub key_id: String,
    pub total_amount: Price,
    #[serde(default)]
    pub currency: CurrencyCode,
}

/// Everything the payment widget needs to collect a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub key_id: String,
    pub order_id: PaymentOrderId,
    /// Amount in minor units (paise for INR).
    pub amount_minor: i64,
    pub currency: CurrencyCode,
    pub merchant_name: String,
    pub description: String,
    pub prefill: Prefill,
}

/// Contact fields prefilled in the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
}

/// Proof of payment handed back by the widget; sent as-is to the
/// verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: PaymentId,
    #[serde(rename = "razorpay_order_id")]
    pub order_id: PaymentOrderId,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

/// How the payment widget finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The gateway authorized the payment; it still needs server-side
    /// verification.
    Authorized(PaymentAuthorization),
    /// The shopper closed the widget.
    Cancelled,
    /// The gateway reported a failure.
    Failed { description: Option<String> },
}

/// A verified, completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: PaymentOrderId,
    pub payment_id: PaymentId,
    pub amount: Price,
    pub currency: CurrencyCode,
}
