//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `FLORIST_API_BASE` - Shop API origin (default: <https://apiflower.technorapide.in>)
//! - `FLORIST_AUTH_BASE` - Account/OTP service base (default: `<api base>/api/auth`)
//! - `FLORIST_SESSION_FILE` - Where the session is persisted
//!   (default: `$HOME/.royal-florist/session.json`)
//! - `FLORIST_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `FLORIST_CURRENCY` - Checkout currency (default: INR)
//! - `FLORIST_MERCHANT_NAME` - Name shown in the payment widget (default: Flower Shop)
//! - `FLORIST_SHIP_PINCODE`, `FLORIST_SHIP_CITY`, `FLORIST_SHIP_STATE` - Shipping
//!   region used when the profile has no complete address
//!   (default: 753001, Cuttack, Odisha)

use std::path::PathBuf;
use std::time::Duration;

use royal_florist_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "https://apiflower.technorapide.in";
const DEFAULT_AUTH_PATH: &str = "api/auth/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_DIR: &str = ".royal-florist";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shop API base (catalog, cart, wishlist, profile, payments).
    pub api_base: Url,
    /// Account service base (registration, login, password reset).
    pub auth_base: Url,
    /// File holding the persisted session.
    pub session_file: PathBuf,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Checkout configuration.
    pub checkout: CheckoutConfig,
}

/// Checkout and payment widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Currency sent with new payment orders.
    pub currency: CurrencyCode,
    /// Merchant name shown in the payment widget.
    pub merchant_name: String,
    /// Shipping region used when the profile address is incomplete.
    pub fallback_region: ShippingRegion,
}

/// The part of an address the payment order needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRegion {
    pub pincode: String,
    pub city: String,
    pub state: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::INR,
            merchant_name: "Flower Shop".to_string(),
            fallback_region: ShippingRegion {
                pincode: "753001".to_string(),
                city: "Cuttack".to_string(),
                state: "Odisha".to_string(),
            },
        }
    }
}

impl StorefrontConfig {
    /// Build a configuration pointing at `api_base` with every other
    /// setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the auth base cannot be
    /// derived from `api_base` (e.g. a `data:` URL).
    pub fn new(api_base: Url) -> Result<Self, ConfigError> {
        let api_base = with_trailing_slash(api_base);
        let auth_base = api_base
            .join(DEFAULT_AUTH_PATH)
            .map_err(|e| ConfigError::InvalidEnvVar("FLORIST_AUTH_BASE".to_string(), e.to_string()))?;

        Ok(Self {
            api_base,
            auth_base,
            session_file: default_session_file(None),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            checkout: CheckoutConfig::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = parse_url(
            "FLORIST_API_BASE",
            &lookup("FLORIST_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        )?;
        let mut config = Self::new(api_base)?;

        if let Some(auth_base) = lookup("FLORIST_AUTH_BASE") {
            config.auth_base = with_trailing_slash(parse_url("FLORIST_AUTH_BASE", &auth_base)?);
        }

        config.session_file = lookup("FLORIST_SESSION_FILE").map_or_else(
            || default_session_file(lookup("HOME")),
            PathBuf::from,
        );

        if let Some(secs) = lookup("FLORIST_HTTP_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("FLORIST_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    "FLORIST_HTTP_TIMEOUT_SECS".to_string(),
                    "must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(currency) = lookup("FLORIST_CURRENCY") {
            config.checkout.currency = currency
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("FLORIST_CURRENCY".to_string(), e))?;
        }

        if let Some(name) = non_blank(lookup("FLORIST_MERCHANT_NAME")) {
            config.checkout.merchant_name = name;
        }

        let region = &mut config.checkout.fallback_region;
        if let Some(pincode) = non_blank(lookup("FLORIST_SHIP_PINCODE")) {
            region.pincode = pincode;
        }
        if let Some(city) = non_blank(lookup("FLORIST_SHIP_CITY")) {
            region.city = city;
        }
        if let Some(state) = non_blank(lookup("FLORIST_SHIP_STATE")) {
            region.state = state;
        }

        Ok(config)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Endpoint paths are joined relative to the base, which drops the last
/// path segment unless the base ends in a slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_session_file(home: Option<String>) -> PathBuf {
    home.filter(|h| !h.is_empty()).map_or_else(
        || PathBuf::from(format!(".royal-florist-{SESSION_FILE}")),
        |home| PathBuf::from(home).join(SESSION_DIR).join(SESSION_FILE),
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[("HOME", "/home/ada")])).unwrap();

        assert_eq!(config.api_base.as_str(), "https://apiflower.technorapide.in/");
        assert_eq!(
            config.auth_base.as_str(),
            "https://apiflower.technorapide.in/api/auth/"
        );
        assert_eq!(
            config.session_file,
            PathBuf::from("/home/ada/.royal-florist/session.json")
        );
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.checkout, CheckoutConfig::default());
    }

    #[test]
    fn test_session_file_without_home() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.session_file,
            PathBuf::from(".royal-florist-session.json")
        );
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("FLORIST_API_BASE", "http://localhost:5000/shop"),
            ("FLORIST_AUTH_BASE", "http://localhost:5001/api/auth"),
            ("FLORIST_SESSION_FILE", "/tmp/florist.json"),
            ("FLORIST_HTTP_TIMEOUT_SECS", "5"),
            ("FLORIST_CURRENCY", "usd"),
            ("FLORIST_MERCHANT_NAME", "Royal Florist"),
            ("FLORIST_SHIP_CITY", "London"),
        ]))
        .unwrap();

        assert_eq!(config.api_base.as_str(), "http://localhost:5000/shop/");
        assert_eq!(config.auth_base.as_str(), "http://localhost:5001/api/auth/");
        assert_eq!(config.session_file, PathBuf::from("/tmp/florist.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.checkout.currency, CurrencyCode::USD);
        assert_eq!(config.checkout.merchant_name, "Royal Florist");
        assert_eq!(config.checkout.fallback_region.city, "London");
        assert_eq!(config.checkout.fallback_region.state, "Odisha");
    }

    #[test]
    fn test_invalid_values() {
        let err = StorefrontConfig::from_lookup(lookup(&[("FLORIST_API_BASE", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "FLORIST_API_BASE"));

        let err = StorefrontConfig::from_lookup(lookup(&[("FLORIST_API_BASE", "ftp://shop")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err =
            StorefrontConfig::from_lookup(lookup(&[("FLORIST_HTTP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_lookup(lookup(&[("FLORIST_CURRENCY", "XYZ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
