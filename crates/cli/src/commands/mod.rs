//! Subcommand implementations.

pub mod account;
pub mod shop;

use royal_florist_storefront::StorefrontError;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Errors the user can fix by answering again. Their notice has already
/// been shown.
const fn retryable(err: &StorefrontError) -> bool {
    matches!(
        err,
        StorefrontError::Validation(_) | StorefrontError::RemoteRejected { .. }
    )
}
