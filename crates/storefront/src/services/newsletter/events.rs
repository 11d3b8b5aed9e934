//! Diagnostic events emitted by the signup flow.
//!
//! The flow reports what happened through a [`SignupObserver`] instead of
//! logging directly, so tests can assert on the decisions it made.

use icecube_core::{Email, EmailError};

use crate::shopify::CustomerId;

/// A decision point reached while handling one signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupEvent {
    InvalidEmail { reason: EmailError },
    /// No registry configured; the signup was only logged.
    CredentialsMissing { email: Email },
    StructuredCreated { email: Email },
    StructuredConflict { email: Email },
    /// The structured API answered with validation errors that were not a conflict.
    StructuredRejected { email: Email, reason: String },
    /// The structured API call itself failed.
    StructuredUnavailable { email: Email, error: String },
    LegacyCreated {
        email: Email,
        customer_id: Option<CustomerId>,
    },
    LegacyConflict { email: Email },
    LegacyFailed { email: Email, error: String },
    /// The consent update after a legacy create failed. The signup still counts.
    ConsentNormalizationFailed {
        customer_id: CustomerId,
        error: String,
    },
    ExistingCustomerSubscribed { customer_id: CustomerId },
    ExistingCustomerUpdateFailed {
        customer_id: CustomerId,
        error: String,
    },
    /// A conflict was reported but the lookup found nobody.
    ExistingCustomerNotFound { email: Email },
    CustomerLookupFailed { email: Email, error: String },
}

impl SignupEvent {
    /// Stable name for the event, used as the `event` log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEmail { .. } => "invalid_email",
            Self::CredentialsMissing { .. } => "credentials_missing",
            Self::StructuredCreated { .. } => "structured_created",
            Self::StructuredConflict { .. } => "structured_conflict",
            Self::StructuredRejected { .. } => "structured_rejected",
            Self::StructuredUnavailable { .. } => "structured_unavailable",
            Self::LegacyCreated { .. } => "legacy_created",
            Self::LegacyConflict { .. } => "legacy_conflict",
            Self::LegacyFailed { .. } => "legacy_failed",
            Self::ConsentNormalizationFailed { .. } => "consent_normalization_failed",
            Self::ExistingCustomerSubscribed { .. } => "existing_customer_subscribed",
            Self::ExistingCustomerUpdateFailed { .. } => "existing_customer_update_failed",
            Self::ExistingCustomerNotFound { .. } => "existing_customer_not_found",
            Self::CustomerLookupFailed { .. } => "customer_lookup_failed",
        }
    }
}

/// Receives signup diagnostics.
pub trait SignupObserver: Send + Sync {
    fn record(&self, event: &SignupEvent);
}

/// Writes signup events as structured `tracing` events.
///
/// Warnings and errors reach Sentry through the tracing integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SignupObserver for TracingObserver {
    fn record(&self, event: &SignupEvent) {
        let kind = event.kind();
        match event {
            SignupEvent::InvalidEmail { reason } => {
                tracing::debug!(event = kind, %reason, "Rejected newsletter signup");
            }
            SignupEvent::CredentialsMissing { email } => {
                tracing::warn!(
                    event = kind,
                    %email,
                    "Shopify Admin API not configured, newsletter signup logged only"
                );
            }
            SignupEvent::StructuredCreated { email } => {
                tracing::info!(event = kind, %email, "Customer created for newsletter");
            }
            SignupEvent::StructuredConflict { email } | SignupEvent::LegacyConflict { email } => {
                tracing::info!(
                    event = kind,
                    %email,
                    "Customer already exists, updating marketing consent"
                );
            }
            SignupEvent::StructuredRejected { email, reason } => {
                tracing::warn!(
                    event = kind,
                    %email,
                    %reason,
                    "customerCreate rejected input, falling back to REST"
                );
            }
            SignupEvent::StructuredUnavailable { email, error } => {
                tracing::warn!(
                    event = kind,
                    %email,
                    %error,
                    "customerCreate failed, falling back to REST"
                );
            }
            SignupEvent::LegacyCreated { email, customer_id } => {
                tracing::info!(
                    event = kind,
                    %email,
                    customer_id = customer_id.as_ref().map(CustomerId::as_str),
                    "Customer created for newsletter via REST"
                );
            }
            SignupEvent::LegacyFailed { email, error } => {
                tracing::error!(event = kind, %email, %error, "Newsletter signup failed");
            }
            SignupEvent::ConsentNormalizationFailed { customer_id, error } => {
                tracing::warn!(
                    event = kind,
                    %customer_id,
                    %error,
                    "Failed to normalize marketing consent after REST create"
                );
            }
            SignupEvent::ExistingCustomerSubscribed { customer_id } => {
                tracing::info!(event = kind, %customer_id, "Existing customer subscribed");
            }
            SignupEvent::ExistingCustomerUpdateFailed { customer_id, error } => {
                tracing::warn!(
                    event = kind,
                    %customer_id,
                    %error,
                    "Failed to update existing customer's marketing consent"
                );
            }
            SignupEvent::ExistingCustomerNotFound { email } => {
                tracing::warn!(
                    event = kind,
                    %email,
                    "Conflict reported but no customer found for email"
                );
            }
            SignupEvent::CustomerLookupFailed { email, error } => {
                tracing::warn!(event = kind, %email, %error, "Customer lookup failed");
            }
        }
    }
}
