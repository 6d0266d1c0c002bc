//! Royal Florist Core - Shared domain types.
//!
//! This crate provides the types used across the Royal Florist components:
//! - `storefront` - Client library for the florist shop API
//! - `cli` - Interactive command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for ids, prices, emails, passwords, OTP codes,
//!   flow stages and user profiles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
