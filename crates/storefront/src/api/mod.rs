//! HTTP transport for the florist shop API.
//!
//! Every remote call goes through [`ApiClient`]. When the session holds a
//! token it is attached as a bearer credential; otherwise the request is sent
//! anonymously. Calls are independent: nothing is retried, cached or
//! deduplicated, and concurrent calls race freely.

mod endpoints;

pub use endpoints::{Endpoint, Service};

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::session::SessionStore;

/// A `{msg}` payload, the API's standard acknowledgement and error shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

impl Message {
    /// The server text, or `fallback` when it sent none.
    #[must_use]
    pub fn text_or(&self, fallback: &str) -> String {
        self.msg
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Client for the shop and account services.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: Client,
    api_base: Url,
    auth_base: Url,
    session: SessionStore,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("auth_base", &self.inner.auth_base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured services, reading credentials
    /// from `session`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, session: SessionStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("royal-florist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                api_base: config.api_base.clone(),
                auth_base: config.auth_base.clone(),
                session,
            }),
        })
    }

    /// The session whose token this client attaches.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Call an endpoint without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call_with`].
    pub async fn call<T>(&self, endpoint: Endpoint) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(endpoint, None::<&()>).await
    }

    /// Call an endpoint with a JSON body.
    ///
    /// # Errors
    ///
    /// - `RemoteRejected` for non-2xx answers, carrying the server's `msg`
    /// - `Unauthenticated` when the server refuses the session token; the
    ///   session is cleared
    /// - `Transport` when no response arrives
    /// - `Decode` when the body does not match `T`
    pub async fn call_with<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(endpoint, Some(body)).await
    }

    #[instrument(skip(self, body), fields(endpoint = %endpoint, status))]
    async fn execute<B, T>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let base = match endpoint.service() {
            Service::Auth => &self.inner.auth_base,
            Service::Shop => &self.inner.api_base,
        };
        let url = endpoint
            .url(base)
            .map_err(|e| StorefrontError::Decode(format!("bad endpoint url: {e}")))?;

        let mut request = self.inner.http.request(endpoint.method(), url);
        let bearer = self.inner.session.bearer();
        if let Some(token) = &bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        let bytes = response.bytes().await?;

        if status.is_success() {
            debug!("Request succeeded");
            return decode(&bytes);
        }

        if status == StatusCode::UNAUTHORIZED && bearer.is_some() {
            warn!("Session token rejected, signing out");
            if let Err(e) = self.inner.session.clear() {
                warn!(error = %e, "Failed to purge rejected session");
            }
            return Err(StorefrontError::Unauthenticated);
        }

        let message = serde_json::from_slice::<Message>(&bytes)
            .ok()
            .and_then(|m| m.msg)
            .unwrap_or_default();
        warn!(message = %message, "Request rejected");
        Err(StorefrontError::RemoteRejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decode a success body. An empty body reads as `{}` so acknowledgement
/// types with only optional fields still decode.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| StorefrontError::Decode(e.to_string()))
}
