//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PUBLIC_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `PRIVATE_ADMIN_API_ACCESS_TOKEN` - Admin API access token (server-side only)
//! - `SHOPIFY_ADMIN_API_VERSION` - Admin API version (default: 2024-10)
//! - `SHOPIFY_ADMIN_TIMEOUT_SECS` - Per-request timeout for Admin API calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! The Admin API section is only enabled when both the store domain and the
//! access token are present. Without it, newsletter signups are logged and
//! acknowledged but never reach Shopify.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_ADMIN_API_VERSION: &str = "2024-10";
const DEFAULT_ADMIN_TIMEOUT_SECS: &str = "10";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration, absent when credentials are missing
    pub shopify_admin: Option<ShopifyAdminConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Admin API version (e.g., 2024-10)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Timeout applied to every Admin API request
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let shopify_admin = ShopifyAdminConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            shopify_admin,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAdminConfig {
    /// Load the Admin API section.
    ///
    /// Returns `Ok(None)` when the domain or token is missing, blank, or the
    /// token looks like a placeholder left over from an example `.env`.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let store = get_optional_env("PUBLIC_STORE_DOMAIN");
        let token = get_optional_env("PRIVATE_ADMIN_API_ACCESS_TOKEN");

        let (Some(store), Some(token)) = (store, token) else {
            return Ok(None);
        };

        if placeholder_pattern(&token).is_some() {
            return Ok(None);
        }

        let timeout_secs = get_env_or_default("SHOPIFY_ADMIN_TIMEOUT_SECS", DEFAULT_ADMIN_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPIFY_ADMIN_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let config = Self {
            store,
            api_version: get_env_or_default("SHOPIFY_ADMIN_API_VERSION", DEFAULT_ADMIN_API_VERSION),
            access_token: SecretString::from(token),
            timeout: Duration::from_secs(timeout_secs),
        };

        // Fail at startup rather than on the first signup
        config.base_url()?;

        Ok(Some(config))
    }

    /// Base URL of the store's Admin API host.
    ///
    /// `store` is normally a bare domain and gets `https://`; an explicit
    /// `http://` or `https://` prefix is kept as-is (local mocks, proxies).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the result is not a valid URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = if self.store.starts_with("http://") || self.store.starts_with("https://") {
            self.store.clone()
        } else {
            format!("https://{}", self.store)
        };

        Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("PUBLIC_STORE_DOMAIN".to_string(), e.to_string()))
    }

    /// Origin allowed in the CSP `connect-src` directive.
    #[must_use]
    pub fn csp_origin(&self) -> Option<String> {
        self.base_url().ok().map(|url| url.origin().ascii_serialization())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Return the first placeholder pattern found in `value`, if any.
fn placeholder_pattern(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}
