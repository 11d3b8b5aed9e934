//! Domain types for the Shopify Admin customer API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of a customer's GraphQL global ID.
const CUSTOMER_GID_PREFIX: &str = "gid://shopify/Customer/";

/// Opaque customer identifier, always in global ID form
/// (`gid://shopify/Customer/123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Wrap a global ID as returned by the GraphQL API.
    #[must_use]
    pub fn from_gid(gid: impl Into<String>) -> Self {
        Self(gid.into())
    }

    /// Build the global ID for a numeric id returned by the REST API.
    #[must_use]
    pub fn from_legacy_id(id: u64) -> Self {
        Self(format!("{CUSTOMER_GID_PREFIX}{id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validation error from a GraphQL mutation's `userErrors` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, e.g. `["email"]` or `["input", "email"]`.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl UserError {
    /// Whether this error reports that the email already belongs to a customer.
    #[must_use]
    pub fn is_email_taken(&self) -> bool {
        let on_email = self
            .field
            .as_ref()
            .is_some_and(|path| path.iter().any(|f| f.eq_ignore_ascii_case("email")));

        on_email && is_taken_message(&self.message)
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Whether a validation message says the address is already registered.
///
/// Shopify has used "has already been taken" and "already exists" over time.
#[must_use]
pub fn is_taken_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("taken") || lower.contains("already exists")
}

/// Result of asking either API surface to create a customer.
///
/// Transport problems are not represented here; they are the `Err` side of
/// the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The customer was created. The id may be missing from a legacy response.
    Created(Option<CustomerId>),
    /// A customer with this email already exists.
    EmailTaken,
    /// The registry refused the input for some other reason.
    Rejected(String),
}

/// Summarize `userErrors` into a single `CreateOutcome`.
///
/// An email-taken error wins over any other error in the same list.
pub(crate) fn outcome_from_user_errors(errors: &[UserError]) -> CreateOutcome {
    if errors.iter().any(UserError::is_email_taken) {
        return CreateOutcome::EmailTaken;
    }

    CreateOutcome::Rejected(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_error(field: &[&str], message: &str) -> UserError {
        UserError {
            field: Some(field.iter().map(|f| (*f).to_string()).collect()),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_customer_id_from_legacy_id() {
        let id = CustomerId::from_legacy_id(123);
        assert_eq!(id.as_str(), "gid://shopify/Customer/123");
    }

    #[test]
    fn test_email_taken_detection() {
        assert!(user_error(&["email"], "Email has already been taken").is_email_taken());
        assert!(user_error(&["input", "email"], "has already been taken").is_email_taken());
        assert!(user_error(&["email"], "Customer already exists").is_email_taken());

        assert!(!user_error(&["email"], "Email is invalid").is_email_taken());
        assert!(!user_error(&["phone"], "Phone has already been taken").is_email_taken());

        let no_field = UserError {
            field: None,
            message: "Email has already been taken".to_string(),
        };
        assert!(!no_field.is_email_taken());
    }

    #[test]
    fn test_outcome_from_user_errors() {
        let taken = [
            user_error(&["phone"], "Phone is invalid"),
            user_error(&["email"], "Email has already been taken"),
        ];
        assert_eq!(outcome_from_user_errors(&taken), CreateOutcome::EmailTaken);

        let other = [user_error(&["email"], "Email is invalid")];
        assert_eq!(
            outcome_from_user_errors(&other),
            CreateOutcome::Rejected("email: Email is invalid".to_string())
        );
    }
}
