//! Customer operations used by newsletter signup.

use chrono::Utc;
use icecube_core::{Email, EmailMarketingConsent, rest_timestamp};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{AdminClient, check_status};
use crate::shopify::ShopifyError;
use crate::shopify::types::{
    CreateOutcome, CustomerId, UserError, is_taken_message, outcome_from_user_errors,
};

const CUSTOMER_CREATE: &str = r"
mutation customerCreate($input: CustomerInput!) {
  customerCreate(input: $input) {
    customer {
      id
      email
    }
    userErrors {
      field
      message
    }
  }
}
";

const CUSTOMER_BY_EMAIL: &str = r"
query customerByEmail($query: String!) {
  customers(first: 1, query: $query) {
    edges {
      node {
        id
        email
      }
    }
  }
}
";

const CUSTOMER_EMAIL_MARKETING_CONSENT_UPDATE: &str = r"
mutation customerEmailMarketingConsentUpdate($input: CustomerEmailMarketingConsentUpdateInput!) {
  customerEmailMarketingConsentUpdate(input: $input) {
    customer {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";

// =============================================================================
// Response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreateData {
    customer_create: Option<CustomerCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreatePayload {
    customer: Option<CustomerNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct CustomerNode {
    id: CustomerId,
}

#[derive(Debug, Deserialize)]
struct CustomersData {
    customers: CustomerEdges,
}

#[derive(Debug, Deserialize)]
struct CustomerEdges {
    #[serde(default)]
    edges: Vec<CustomerEdge>,
}

#[derive(Debug, Deserialize)]
struct CustomerEdge {
    node: CustomerNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsentUpdateData {
    customer_email_marketing_consent_update: Option<ConsentUpdatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsentUpdatePayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

/// Body for the legacy `POST customers.json` resource.
#[derive(Debug, Serialize)]
struct RestCustomerRequest<'a> {
    customer: RestCustomerInput<'a>,
}

#[derive(Debug, Serialize)]
struct RestCustomerInput<'a> {
    email: &'a str,
    accepts_marketing: bool,
    accepts_marketing_updated_at: String,
    marketing_opt_in_level: &'static str,
    tags: String,
}

#[derive(Debug, Deserialize)]
struct RestCustomerResponse {
    customer: Option<RestCustomer>,
}

#[derive(Debug, Deserialize)]
struct RestCustomer {
    id: Option<u64>,
}

impl AdminClient {
    /// Create a customer through the GraphQL `customerCreate` mutation.
    ///
    /// Validation problems are reported through `CreateOutcome`, not as errors.
    /// A payload with neither a customer nor `userErrors` is `Rejected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Shopify answers with a
    /// non-success status, or the response carries top-level GraphQL errors.
    #[instrument(skip(self, email, consent), fields(email = %email))]
    pub async fn create_customer(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
        tags: &[&str],
    ) -> Result<CreateOutcome, ShopifyError> {
        let variables = json!({
            "input": {
                "email": email.as_str(),
                "tags": tags,
                "emailMarketingConsent": consent,
            }
        });

        let data: CustomerCreateData = self.graphql(CUSTOMER_CREATE, Some(variables)).await?;
        let payload = data.customer_create.ok_or_else(|| {
            ShopifyError::UserError("customerCreate returned no payload".to_string())
        })?;

        if !payload.user_errors.is_empty() {
            return Ok(outcome_from_user_errors(&payload.user_errors));
        }

        Ok(payload.customer.map_or_else(
            || CreateOutcome::Rejected("customerCreate returned no customer".to_string()),
            |c| CreateOutcome::Created(Some(c.id)),
        ))
    }

    /// Create a customer through the legacy REST `customers.json` resource.
    ///
    /// A 422 whose `email` errors say the address is taken maps to
    /// `CreateOutcome::EmailTaken`; any other 422 is `Rejected`. Any 2xx is
    /// `Created`, with the id when the body carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify answers with a
    /// non-success status other than 422.
    #[instrument(skip(self, email, consent), fields(email = %email))]
    pub async fn create_customer_rest(
        &self,
        email: &Email,
        consent: &EmailMarketingConsent,
        tags: &[&str],
    ) -> Result<CreateOutcome, ShopifyError> {
        let updated_at = consent.consent_updated_at.unwrap_or_else(Utc::now);
        let body = RestCustomerRequest {
            customer: RestCustomerInput {
                email: email.as_str(),
                accepts_marketing: consent.is_subscribed(),
                accepts_marketing_updated_at: rest_timestamp(updated_at),
                marketing_opt_in_level: consent.marketing_opt_in_level.as_rest_str(),
                tags: tags.join(", "),
            },
        };

        let response = self.rest_post("customers.json", &body).await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await?;
            return Ok(outcome_from_rest_errors(&body));
        }

        let response = check_status(response).await?;
        let body = response.bytes().await?;

        // The customer exists once Shopify accepts the request; the id only
        // drives consent normalization.
        let id = serde_json::from_slice::<RestCustomerResponse>(&body)
            .ok()
            .and_then(|created| created.customer)
            .and_then(|c| c.id)
            .map(CustomerId::from_legacy_id);
        if id.is_none() {
            tracing::debug!("Legacy customer create response carried no customer id");
        }

        Ok(CreateOutcome::Created(id))
    }

    /// Find the first customer whose email matches exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, email), fields(email = %email))]
    pub async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<CustomerId>, ShopifyError> {
        let variables = json!({ "query": email_search_query(email) });

        let data: CustomersData = self.graphql(CUSTOMER_BY_EMAIL, Some(variables)).await?;

        Ok(data.customers.edges.into_iter().next().map(|e| e.node.id))
    }

    /// Replace a customer's email marketing consent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the mutation reports
    /// `userErrors`.
    #[instrument(skip(self, id, consent), fields(customer_id = %id))]
    pub async fn update_email_marketing_consent(
        &self,
        id: &CustomerId,
        consent: &EmailMarketingConsent,
    ) -> Result<(), ShopifyError> {
        let variables = json!({
            "input": {
                "customerId": id,
                "emailMarketingConsent": consent,
            }
        });

        let data: ConsentUpdateData = self
            .graphql(CUSTOMER_EMAIL_MARKETING_CONSENT_UPDATE, Some(variables))
            .await?;
        let payload = data.customer_email_marketing_consent_update.ok_or_else(|| {
            ShopifyError::UserError(
                "customerEmailMarketingConsentUpdate returned no payload".to_string(),
            )
        })?;

        if !payload.user_errors.is_empty() {
            let messages: Vec<String> = payload.user_errors.iter().map(ToString::to_string).collect();
            return Err(ShopifyError::UserError(messages.join("; ")));
        }

        Ok(())
    }
}

/// Customer search syntax for an exact email match.
///
/// The address is quoted so characters like `+` and `:` are not read as
/// search operators.
fn email_search_query(email: &Email) -> String {
    let escaped = email.as_str().replace('\\', "\\\\").replace('"', "\\\"");
    format!("email:\"{escaped}\"")
}

/// Interpret a REST 422 body such as `{"errors":{"email":["has already been taken"]}}`.
fn outcome_from_rest_errors(body: &str) -> CreateOutcome {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return CreateOutcome::Rejected(body.to_string());
    };

    let errors = parsed.get("errors").unwrap_or(&Value::Null);

    let email_messages: Vec<&str> = match errors.get("email") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(message)) => vec![message.as_str()],
        _ => Vec::new(),
    };

    if email_messages.iter().any(|m| is_taken_message(m)) {
        return CreateOutcome::EmailTaken;
    }

    match errors {
        Value::String(message) => CreateOutcome::Rejected(message.clone()),
        Value::Null => CreateOutcome::Rejected(body.to_string()),
        other => CreateOutcome::Rejected(other.to_string()),
    }
}
