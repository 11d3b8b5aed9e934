//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::newsletter::NewsletterService;
use crate::shopify::{AdminClient, ShopifyError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Nothing in it is mutable, so
/// concurrent signups never contend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    newsletter: NewsletterService<AdminClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Without Admin API credentials the newsletter service runs in
    /// logged-only mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the Admin API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let admin = config
            .shopify_admin
            .as_ref()
            .map(AdminClient::new)
            .transpose()?;

        let newsletter = NewsletterService::new(admin);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, newsletter }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the newsletter service.
    #[must_use]
    pub fn newsletter(&self) -> &NewsletterService<AdminClient> {
        &self.inner.newsletter
    }
}
