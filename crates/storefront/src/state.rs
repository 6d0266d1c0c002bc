//! The storefront context shared by every service.

use std::sync::Arc;

use royal_florist_core::FlowKind;
use tracing::debug;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::checkout::CheckoutService;
use crate::services::otp::OtpFlow;
use crate::services::profile::ProfileService;
use crate::services::wishlist::WishlistService;
use crate::session::{FileStorage, SessionStore, Storage};

/// Configuration, transport, session and notifier, passed explicitly to
/// every operation.
///
/// This struct is cheaply cloneable via `Arc`; clones share one session.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    session: SessionStore,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Open the storefront with the session persisted at
    /// `config.session_file`, reporting through `notifier`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the session file cannot be read or purged, or
    /// `Transport` if the HTTP client cannot be built.
    pub fn open(config: StorefrontConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(config.session_file.clone()));
        Self::with_storage(config, storage, notifier)
    }

    /// Open the storefront on an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// See [`Storefront::open`].
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = SessionStore::restore(storage)?;
        let api = ApiClient::new(&config, session.clone())?;
        debug!(
            api_base = %config.api_base,
            signed_in = session.is_authenticated(),
            "Storefront ready"
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                session,
                api,
                notifier,
            }),
        })
    }

    /// Open with the session file from `config` and log-only notices.
    ///
    /// # Errors
    ///
    /// See [`Storefront::open`].
    pub fn open_quiet(config: StorefrontConfig) -> Result<Self> {
        Self::open(config, Arc::new(TracingNotifier))
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Start an OTP flow of the given kind.
    #[must_use]
    pub fn otp(&self, kind: FlowKind) -> OtpFlow {
        OtpFlow::new(self.clone(), kind)
    }

    #[must_use]
    pub const fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    #[must_use]
    pub const fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self)
    }

    #[must_use]
    pub const fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(self)
    }

    #[must_use]
    pub const fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(self)
    }

    /// An empty cart view; call `load` to fetch the server cart.
    #[must_use]
    pub fn cart(&self) -> CartService {
        CartService::new(self.clone())
    }

    /// An empty wishlist view; call `load` to fetch it.
    #[must_use]
    pub fn wishlist(&self) -> WishlistService {
        WishlistService::new(self.clone())
    }

    // =========================================================================
    // Notices
    // =========================================================================

    pub(crate) fn success(&self, text: impl Into<String>) {
        self.inner.notifier.notify(Notice::success(text));
    }

    pub(crate) fn failure(&self, err: &StorefrontError, fallback: &str) {
        self.inner.notifier.notify(Notice::error(err.notice_text(fallback)));
    }

    /// Pass `result` through, turning an error into an error notice.
    pub(crate) fn report<T>(&self, result: Result<T>, fallback: &str) -> Result<T> {
        if let Err(err) = &result {
            self.failure(err, fallback);
        }
        result
    }
}
