//! Core types for the Royal Florist storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod otp;
pub mod password;
pub mod price;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpError};
pub use password::{MIN_PASSWORD_LENGTH, PasswordError, validate_new_password};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use user::{Address, ProfileError, ProfileUpdate, User};
