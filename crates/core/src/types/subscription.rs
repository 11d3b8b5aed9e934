//! Newsletter subscription request and result types.

use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};

/// Shown after a signup that reached the customer registry.
pub const MSG_SUBSCRIBED: &str = "Thanks for subscribing!";
/// Shown when the registry is not configured and the signup was only logged.
pub const MSG_LOGGED: &str = "Thanks for subscribing! (Email logged)";
/// Shown when the address already belonged to a customer.
pub const MSG_ALREADY_SUBSCRIBED: &str = "Thanks! You're now subscribed!";
pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_SUBSCRIBE_FAILED: &str = "Failed to subscribe. Please try again.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again later.";

/// A validated newsletter signup.
///
/// The only way to build one is [`SubscriptionRequest::parse`], so holding a
/// `SubscriptionRequest` means the address has already been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    email: Email,
}

impl SubscriptionRequest {
    /// Normalize (trim, lowercase) and validate a raw signup address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the normalized input is not a valid address.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let email = Email::parse(&raw.trim().to_lowercase())?;
        Ok(Self { email })
    }

    #[must_use]
    pub fn into_email(self) -> Email {
        self.email
    }
}

/// Machine-readable failure reason attached to a [`SubscriptionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionErrorCode {
    /// The address failed validation. No network call was made.
    InvalidEmail,
    /// Both customer-create surfaces failed with non-conflict errors.
    SubscribeFailed,
    /// Something outside the normal flow went wrong.
    UnexpectedError,
}

/// Outcome of a signup, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SubscriptionErrorCode>,
}

impl SubscriptionResult {
    /// A successful signup with a user-facing message.
    #[must_use]
    pub fn subscribed(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_owned()),
            error_code: None,
        }
    }

    /// Rejected input. Empty input gets the "required" wording.
    #[must_use]
    pub fn invalid_email(error: &EmailError) -> Self {
        let message = match error {
            EmailError::Empty => MSG_EMAIL_REQUIRED,
            _ => MSG_INVALID_EMAIL,
        };
        Self::failure(SubscriptionErrorCode::InvalidEmail, message)
    }

    /// Every create path failed.
    #[must_use]
    pub fn subscribe_failed() -> Self {
        Self::failure(SubscriptionErrorCode::SubscribeFailed, MSG_SUBSCRIBE_FAILED)
    }

    /// Catch-all for failures outside the signup flow.
    #[must_use]
    pub fn unexpected() -> Self {
        Self::failure(SubscriptionErrorCode::UnexpectedError, MSG_UNEXPECTED)
    }

    fn failure(code: SubscriptionErrorCode, message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_owned()),
            error_code: Some(code),
        }
    }

    /// The user-facing text, empty if none was set.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_input() {
        let request = SubscriptionRequest::parse("  New@Example.COM \n").unwrap();
        assert_eq!(request.into_email().as_str(), "new@example.com");
    }

    #[test]
    fn test_request_rejects_invalid_input() {
        assert_eq!(
            SubscriptionRequest::parse("bad-email"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(SubscriptionRequest::parse("   "), Err(EmailError::Empty));
        assert_eq!(
            SubscriptionRequest::parse("a b@example.com"),
            Err(EmailError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_invalid_email_messages() {
        let empty = SubscriptionResult::invalid_email(&EmailError::Empty);
        assert_eq!(empty.message(), MSG_EMAIL_REQUIRED);
        assert_eq!(empty.error_code, Some(SubscriptionErrorCode::InvalidEmail));

        let malformed = SubscriptionResult::invalid_email(&EmailError::MissingAtSymbol);
        assert!(!malformed.success);
        assert_eq!(malformed.message(), MSG_INVALID_EMAIL);
    }

    #[test]
    fn test_result_json_shape() {
        let ok = serde_json::to_value(SubscriptionResult::subscribed(MSG_SUBSCRIBED)).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"success": true, "message": "Thanks for subscribing!"})
        );

        let failed = serde_json::to_value(SubscriptionResult::subscribe_failed()).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["errorCode"], "SUBSCRIBE_FAILED");
    }
}
