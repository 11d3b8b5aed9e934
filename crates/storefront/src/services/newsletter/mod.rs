//! Newsletter signup.
//!
//! Records a subscriber in the Shopify customer registry with email
//! marketing consent set to subscribed. The registry has two API surfaces
//! that report conflicts differently, so a signup walks a short chain:
//!
//! 1. Create through GraphQL (`customerCreate`).
//! 2. If that fails for any reason other than "email taken", create through
//!    the legacy REST resource.
//! 3. If either surface says the email is taken, look the customer up and
//!    update their consent instead.
//!
//! A duplicate signup always ends in success. Only invalid input, or both
//! create surfaces failing, is reported as a failure.

mod events;
mod registry;

use std::sync::Arc;

use chrono::Utc;
use icecube_core::{
    EmailMarketingConsent, MSG_ALREADY_SUBSCRIBED, MSG_LOGGED, MSG_SUBSCRIBED, Email,
    SubscriptionRequest, SubscriptionResult,
};

pub use events::{SignupEvent, SignupObserver, TracingObserver};
pub use registry::CustomerRegistry;

use crate::shopify::CreateOutcome;

/// Tag applied to every customer created by a signup.
pub const NEWSLETTER_TAG: &str = "newsletter";

/// Where the signup flow goes next.
enum Step {
    TryStructuredCreate,
    TryLegacyCreate,
    ResolveConflict,
    Done(SubscriptionResult),
}

/// Coordinates a newsletter signup against a [`CustomerRegistry`].
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Clone)]
pub struct NewsletterService<R> {
    registry: Option<R>,
    observer: Arc<dyn SignupObserver>,
}

impl<R: CustomerRegistry> NewsletterService<R> {
    /// Create a service. `None` means the registry is not configured and
    /// signups are acknowledged without any outbound call.
    #[must_use]
    pub fn new(registry: Option<R>) -> Self {
        Self {
            registry,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the diagnostics sink.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SignupObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Whether signups reach the registry.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.registry.is_some()
    }

    /// Subscribe `raw_email` to the newsletter.
    ///
    /// Never fails: every outcome, including registry errors, is folded into
    /// the returned [`SubscriptionResult`].
    pub async fn subscribe(&self, raw_email: &str) -> SubscriptionResult {
        let email = match SubscriptionRequest::parse(raw_email) {
            Ok(request) => request.into_email(),
            Err(reason) => {
                let result = SubscriptionResult::invalid_email(&reason);
                self.emit(SignupEvent::InvalidEmail { reason });
                return result;
            }
        };

        let Some(registry) = &self.registry else {
            self.emit(SignupEvent::CredentialsMissing { email });
            return SubscriptionResult::subscribed(MSG_LOGGED);
        };

        let consent = EmailMarketingConsent::subscribed(Utc::now());
        let mut step = Step::TryStructuredCreate;

        loop {
            step = match step {
                Step::TryStructuredCreate => {
                    self.try_structured_create(registry, &email, &consent).await
                }
                Step::TryLegacyCreate => self.try_legacy_create(registry, &email, &consent).await,
                Step::ResolveConflict => self.resolve_conflict(registry, &email, &consent).await,
                Step::Done(result) => return result,
            };
        }
    }

    async fn try_structured_create(
        &self,
        registry: &R,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> Step {
        match registry.create_subscriber(email, consent).await {
            Ok(CreateOutcome::Created(_)) => {
                self.emit(SignupEvent::StructuredCreated {
                    email: email.clone(),
                });
                Step::Done(SubscriptionResult::subscribed(MSG_SUBSCRIBED))
            }
            Ok(CreateOutcome::EmailTaken) => {
                self.emit(SignupEvent::StructuredConflict {
                    email: email.clone(),
                });
                Step::ResolveConflict
            }
            Ok(CreateOutcome::Rejected(reason)) => {
                self.emit(SignupEvent::StructuredRejected {
                    email: email.clone(),
                    reason,
                });
                Step::TryLegacyCreate
            }
            Err(e) => {
                self.emit(SignupEvent::StructuredUnavailable {
                    email: email.clone(),
                    error: e.to_string(),
                });
                Step::TryLegacyCreate
            }
        }
    }

    async fn try_legacy_create(
        &self,
        registry: &R,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> Step {
        match registry.create_subscriber_legacy(email, consent).await {
            Ok(CreateOutcome::Created(customer_id)) => {
                self.emit(SignupEvent::LegacyCreated {
                    email: email.clone(),
                    customer_id: customer_id.clone(),
                });

                // Best effort: the REST resource ignores the newer consent
                // fields, so set them through GraphQL. The signup stands
                // either way.
                if let Some(id) = customer_id
                    && let Err(e) = registry.subscribe_customer(&id, consent).await
                {
                    self.emit(SignupEvent::ConsentNormalizationFailed {
                        customer_id: id,
                        error: e.to_string(),
                    });
                }

                Step::Done(SubscriptionResult::subscribed(MSG_SUBSCRIBED))
            }
            Ok(CreateOutcome::EmailTaken) => {
                self.emit(SignupEvent::LegacyConflict {
                    email: email.clone(),
                });
                Step::ResolveConflict
            }
            Ok(CreateOutcome::Rejected(error)) => {
                self.emit(SignupEvent::LegacyFailed {
                    email: email.clone(),
                    error,
                });
                Step::Done(SubscriptionResult::subscribe_failed())
            }
            Err(e) => {
                self.emit(SignupEvent::LegacyFailed {
                    email: email.clone(),
                    error: e.to_string(),
                });
                Step::Done(SubscriptionResult::subscribe_failed())
            }
        }
    }

    async fn resolve_conflict(
        &self,
        registry: &R,
        email: &Email,
        consent: &EmailMarketingConsent,
    ) -> Step {
        let customer_id = match registry.find_customer(email).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                self.emit(SignupEvent::ExistingCustomerNotFound {
                    email: email.clone(),
                });
                return Step::Done(SubscriptionResult::subscribed(MSG_ALREADY_SUBSCRIBED));
            }
            Err(e) => {
                self.emit(SignupEvent::CustomerLookupFailed {
                    email: email.clone(),
                    error: e.to_string(),
                });
                return Step::Done(SubscriptionResult::subscribed(MSG_ALREADY_SUBSCRIBED));
            }
        };

        match registry.subscribe_customer(&customer_id, consent).await {
            Ok(()) => {
                self.emit(SignupEvent::ExistingCustomerSubscribed { customer_id });
                Step::Done(SubscriptionResult::subscribed(MSG_SUBSCRIBED))
            }
            Err(e) => {
                self.emit(SignupEvent::ExistingCustomerUpdateFailed {
                    customer_id,
                    error: e.to_string(),
                });
                Step::Done(SubscriptionResult::subscribed(MSG_ALREADY_SUBSCRIBED))
            }
        }
    }

    fn emit(&self, event: SignupEvent) {
        self.observer.record(&event);
    }
}
