//! Core types for the Icecube storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod marketing;
pub mod subscription;

pub use email::{Email, EmailError};
pub use marketing::{EmailMarketingConsent, MarketingOptInLevel, MarketingState, rest_timestamp};
pub use subscription::{
    MSG_ALREADY_SUBSCRIBED, MSG_EMAIL_REQUIRED, MSG_INVALID_EMAIL, MSG_LOGGED,
    MSG_SUBSCRIBE_FAILED, MSG_SUBSCRIBED, MSG_UNEXPECTED, SubscriptionErrorCode,
    SubscriptionRequest, SubscriptionResult,
};
