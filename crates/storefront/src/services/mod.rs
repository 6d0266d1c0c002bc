//! Storefront operations.
//!
//! # Services
//!
//! - `otp` - Code-verified registration, login and password reset
//! - `auth` - Password login, logout and the signed-in guard
//! - `catalog` - Categories and products
//! - `cart` - Server-authoritative cart
//! - `wishlist` - Liked products
//! - `profile` - Contact details of the signed-in customer
//! - `checkout` - Payment order, collection and verification
//!
//! Every failed operation emits one error notice through the storefront's
//! notifier. Successful mutations and account steps emit one success notice;
//! plain reads (catalog, cart load and quantity steps, profile fetch) stay
//! quiet. The outcome is also returned as a `Result`.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod otp;
pub mod profile;
pub mod wishlist;

pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::{CatalogService, CategoryFilter};
pub use checkout::{CheckoutService, PaymentCollector};
pub use otp::{CollectForm, OtpFlow, PasswordPair, VerifyOutcome};
pub use profile::ProfileService;
pub use wishlist::WishlistService;
