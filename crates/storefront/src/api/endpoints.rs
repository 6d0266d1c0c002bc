//! The endpoint table: every remote call the storefront makes.

use std::fmt;

use reqwest::Method;
use royal_florist_core::{FlowKind, ProductId};
use url::Url;

/// Which backend service an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Account service: registration, login, password reset.
    Auth,
    /// Shop service: profile, catalog, cart, wishlist, payments.
    Shop,
}

/// A remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    RegisterRequest,
    RegisterVerify,
    RegisterSetPassword,
    PasswordLogin,
    LoginRequestOtp,
    LoginVerifyOtp,
    ForgotRequestOtp,
    ForgotVerifyOtp,
    ForgotResetPassword,
    Profile,
    ProfileUpdate,
    Categories,
    Products,
    Cart,
    CartAdd,
    CartUpdate,
    CartRemove,
    Wishlist,
    WishlistAdd,
    WishlistRemove(ProductId),
    CreatePaymentOrder,
    VerifyPayment,
}

impl Endpoint {
    /// The endpoint that sends (or re-sends) the code for `kind`.
    #[must_use]
    pub const fn otp_request(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Register => Self::RegisterRequest,
            FlowKind::Login => Self::LoginRequestOtp,
            FlowKind::ForgotPassword => Self::ForgotRequestOtp,
        }
    }

    /// The endpoint that checks a code for `kind`.
    #[must_use]
    pub const fn otp_verify(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Register => Self::RegisterVerify,
            FlowKind::Login => Self::LoginVerifyOtp,
            FlowKind::ForgotPassword => Self::ForgotVerifyOtp,
        }
    }

    /// The password-setting endpoint for `kind`, if the flow has one.
    #[must_use]
    pub const fn otp_finalize(kind: FlowKind) -> Option<Self> {
        match kind {
            FlowKind::Register => Some(Self::RegisterSetPassword),
            FlowKind::ForgotPassword => Some(Self::ForgotResetPassword),
            FlowKind::Login => None,
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Profile | Self::Categories | Self::Products | Self::Cart | Self::Wishlist => {
                Method::GET
            }
            Self::ProfileUpdate => Method::PUT,
            Self::WishlistRemove(_) => Method::DELETE,
            _ => Method::POST,
        }
    }

    #[must_use]
    pub const fn service(&self) -> Service {
        match self {
            Self::RegisterRequest
            | Self::RegisterVerify
            | Self::RegisterSetPassword
            | Self::PasswordLogin
            | Self::LoginRequestOtp
            | Self::LoginVerifyOtp
            | Self::ForgotRequestOtp
            | Self::ForgotVerifyOtp
            | Self::ForgotResetPassword => Service::Auth,
            _ => Service::Shop,
        }
    }

    /// Path relative to the service base. Never starts with a slash.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::RegisterRequest => "register",
            Self::RegisterVerify => "register/verify-otp",
            Self::RegisterSetPassword => "register/set-password",
            Self::PasswordLogin => "login",
            Self::LoginRequestOtp => "auth/login/send-otp",
            Self::LoginVerifyOtp => "auth/login/verify-otp",
            Self::ForgotRequestOtp => "forgot/send-otp",
            Self::ForgotVerifyOtp => "forgot/verify-otp",
            Self::ForgotResetPassword => "forgot/reset-password",
            Self::Profile => "api/auth/profile",
            Self::ProfileUpdate => "api/profile/me",
            Self::Categories => "api/categories/getCategories",
            Self::Products => "api/products/getProducts",
            Self::Cart => "api/cart/me",
            Self::CartAdd => "api/cart/add",
            Self::CartUpdate => "api/cart/update",
            Self::CartRemove => "api/cart/remove",
            Self::Wishlist => "api/wishlist",
            Self::WishlistAdd => "api/wishlist/add",
            Self::WishlistRemove(_) => "api/wishlist/remove",
            Self::CreatePaymentOrder => "api/payments/razorpay/create-order",
            Self::VerifyPayment => "api/payments/razorpay/verify",
        }
    }

    /// Resolve against the service base. Path parameters are
    /// percent-encoded as a single segment.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base` cannot carry a path.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(self.path())?;
        if let Self::WishlistRemove(id) = self {
            url.path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .pop_if_empty()
                .push(id.as_str());
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())?;
        if let Self::WishlistRemove(id) = self {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_paths_resolve_under_auth_base() {
        let base = Url::parse("https://shop.test/api/auth/").unwrap();
        assert_eq!(
            Endpoint::LoginVerifyOtp.url(&base).unwrap().as_str(),
            "https://shop.test/api/auth/auth/login/verify-otp"
        );
        assert_eq!(Endpoint::LoginVerifyOtp.service(), Service::Auth);
    }

    #[test]
    fn test_wishlist_remove_encodes_id() {
        let base = Url::parse("https://shop.test/").unwrap();
        let endpoint = Endpoint::WishlistRemove(ProductId::new("a b/c"));
        assert_eq!(
            endpoint.url(&base).unwrap().as_str(),
            "https://shop.test/api/wishlist/remove/a%20b%2Fc"
        );
        assert_eq!(endpoint.method(), Method::DELETE);
    }

    #[test]
    fn test_flow_table() {
        assert_eq!(
            Endpoint::otp_request(FlowKind::ForgotPassword),
            Endpoint::ForgotRequestOtp
        );
        assert_eq!(Endpoint::otp_finalize(FlowKind::Login), None);
        assert_eq!(
            Endpoint::otp_finalize(FlowKind::Register),
            Some(Endpoint::RegisterSetPassword)
        );
    }

    #[test]
    fn test_methods() {
        assert_eq!(Endpoint::Cart.method(), Method::GET);
        assert_eq!(Endpoint::ProfileUpdate.method(), Method::PUT);
        assert_eq!(Endpoint::CartUpdate.method(), Method::POST);
        assert_eq!(Endpoint::Cart.to_string(), "GET api/cart/me");
    }
}
