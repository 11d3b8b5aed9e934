//! Email marketing consent types.
//!
//! Mirrors the consent sub-record Shopify keeps on each customer. The
//! storefront never owns that record; it only sends these values along with
//! create and update commands.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Whether a customer has agreed to receive marketing email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingState {
    Subscribed,
    NotSubscribed,
    Pending,
}

/// How the customer's marketing consent was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingOptInLevel {
    SingleOptIn,
    ConfirmedOptIn,
}

impl MarketingOptInLevel {
    /// The lowercase spelling used by the legacy REST customer resource.
    #[must_use]
    pub const fn as_rest_str(self) -> &'static str {
        match self {
            Self::SingleOptIn => "single_opt_in",
            Self::ConfirmedOptIn => "confirmed_opt_in",
        }
    }
}

/// Email marketing consent, shaped like the Admin API's
/// `EmailMarketingConsentInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMarketingConsent {
    pub marketing_state: MarketingState,
    pub marketing_opt_in_level: MarketingOptInLevel,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rfc3339_opt"
    )]
    pub consent_updated_at: Option<DateTime<Utc>>,
}

impl EmailMarketingConsent {
    /// Consent for a newsletter signup: subscribed, single opt-in, recorded at `now`.
    #[must_use]
    pub fn subscribed(now: DateTime<Utc>) -> Self {
        Self {
            marketing_state: MarketingState::Subscribed,
            marketing_opt_in_level: MarketingOptInLevel::SingleOptIn,
            consent_updated_at: Some(now),
        }
    }

    /// Whether this consent allows marketing email.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.marketing_state == MarketingState::Subscribed
    }
}

/// Serialize timestamps the way Shopify echoes them back (`2024-10-01T12:00:00Z`).
mod rfc3339_opt {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)] // signature dictated by serde(with)
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}

/// Format a timestamp for the REST `accepts_marketing_updated_at` field.
#[must_use]
pub fn rest_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_subscribed_consent_json() {
        let consent = EmailMarketingConsent::subscribed(fixed_now());
        let json = serde_json::to_value(&consent).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "marketingState": "SUBSCRIBED",
                "marketingOptInLevel": "SINGLE_OPT_IN",
                "consentUpdatedAt": "2024-10-01T12:00:00Z"
            })
        );
        assert!(consent.is_subscribed());
    }

    #[test]
    fn test_consent_without_timestamp_omits_field() {
        let consent = EmailMarketingConsent {
            marketing_state: MarketingState::NotSubscribed,
            marketing_opt_in_level: MarketingOptInLevel::ConfirmedOptIn,
            consent_updated_at: None,
        };
        let json = serde_json::to_value(&consent).unwrap();

        assert_eq!(json["marketingState"], "NOT_SUBSCRIBED");
        assert_eq!(json["marketingOptInLevel"], "CONFIRMED_OPT_IN");
        assert!(json.get("consentUpdatedAt").is_none());
        assert!(!consent.is_subscribed());
    }

    #[test]
    fn test_deserialize_shopify_payload() {
        let consent: EmailMarketingConsent = serde_json::from_str(
            r#"{"marketingState":"PENDING","marketingOptInLevel":"CONFIRMED_OPT_IN","consentUpdatedAt":null}"#,
        )
        .unwrap();

        assert_eq!(consent.marketing_state, MarketingState::Pending);
        assert_eq!(consent.consent_updated_at, None);
    }

    #[test]
    fn test_rest_spellings() {
        assert_eq!(MarketingOptInLevel::SingleOptIn.as_rest_str(), "single_opt_in");
        assert_eq!(rest_timestamp(fixed_now()), "2024-10-01T12:00:00Z");
    }
}
