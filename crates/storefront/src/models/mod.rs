//! Wire models for the shop API.

pub mod cart;
pub mod catalog;
pub mod payment;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use catalog::{Category, Product};
pub use payment::{
    AddressDetails, CheckoutReceipt, CreateOrderRequest, OrderLine, PaymentAuthorization,
    PaymentOrder, PaymentOutcome, PaymentRequest, Prefill, UserDetails,
};
pub use wishlist::WishlistItem;
