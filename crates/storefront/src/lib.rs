//! Royal Florist storefront client library.
//!
//! Everything a front end needs to drive the florist shop API: the session
//! store, OTP-verified account flows, catalog, cart, wishlist, profile and
//! checkout. The library renders nothing; each operation returns a `Result`,
//! and failures plus user-facing successes also emit a [`notify::Notice`].
//!
//! # Example
//!
//! ```rust,no_run
//! use royal_florist_core::FlowKind;
//! use royal_florist_storefront::{Storefront, StorefrontConfig};
//! use royal_florist_storefront::services::CollectForm;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Storefront::open_quiet(StorefrontConfig::from_env()?)?;
//! let mut login = store.otp(FlowKind::Login);
//! login.submit(CollectForm::email("ada@royal.com")).await?;
//! login.verify("123456").await?;
//! let cart = store.cart().load().await?.clone();
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod services;
pub mod session;
pub mod state;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError, ValidationError};
pub use navigation::Destination;
pub use state::Storefront;
