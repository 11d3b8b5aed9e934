//! The seam between the signup flow and the customer registry.

use std::future::Future;

use icecube_core::{Email, EmailMarketingConsent};

use super::NEWSLETTER_TAG;
use crate::shopify::{AdminClient, CreateOutcome, CustomerId, ShopifyError};

/// Customer registry operations needed to record a newsletter signup.
///
/// Every method is a single bounded request; implementations must not retry.
pub trait CustomerRegistry: Send + Sync {
    /// Create a subscribed customer through the structured (GraphQL) API.
    fn create_subscriber(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> impl Future<Output = Result<CreateOutcome, ShopifyError>> + Send;

    /// Create a subscribed customer through the legacy (REST) API.
    fn create_subscriber_legacy(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> impl Future<Output = Result<CreateOutcome, ShopifyError>> + Send;

    /// Look up an existing customer by email.
    fn find_customer(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<CustomerId>, ShopifyError>> + Send;

    /// Set an existing customer's email marketing consent.
    fn subscribe_customer(
        &self,
        id: &CustomerId,
        consent: &EmailMarketingConsent,
    ) -> impl Future<Output = Result<(), ShopifyError>> + Send;
}

impl CustomerRegistry for AdminClient {
    async fn create_subscriber(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> Result<CreateOutcome, ShopifyError> {
        self.create_customer(email, consent, &[NEWSLETTER_TAG]).await
    }

    async fn create_subscriber_legacy(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> Result<CreateOutcome, ShopifyError> {
        self.create_customer_rest(email, consent, &[NEWSLETTER_TAG])
            .await
    }

    async fn find_customer(&self, email: &Email) -> Result<Option<CustomerId>, ShopifyError> {
        self.find_customer_by_email(email).await
    }

    async fn subscribe_customer(
        &self,
        id: &CustomerId,
        consent: &EmailMarketingConsent,
    ) -> Result<(), ShopifyError> {
        self.update_email_marketing_consent(id, consent).await
    }
}
