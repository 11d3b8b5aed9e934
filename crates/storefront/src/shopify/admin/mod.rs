//! Shopify Admin API client (GraphQL + legacy REST).
//!
//! Requests are authenticated with a static access token sent as a default
//! header on every call. The underlying `reqwest::Client` carries the
//! per-request timeout, so every call is bounded.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::config::ShopifyAdminConfig;

use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};

mod customers;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Fallback when a 429 arrives without a usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Shopify Admin API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    graphql_endpoint: Url,
    rest_base: Url,
}

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            let converted = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(ShopifyError::GraphQL(converted));
        }

        self.data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the store domain is not a valid URL, the token
    /// cannot be used as a header value, or the HTTP client fails to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let base_url = config
            .base_url()
            .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))?;

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::InvalidHeader(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let api_root = format!("admin/api/{}/", config.api_version);
        let rest_base = base_url
            .join(&api_root)
            .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))?;
        let graphql_endpoint = rest_base
            .join("graphql.json")
            .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                graphql_endpoint,
                rest_base,
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn graphql_endpoint(&self) -> &Url {
        &self.inner.graphql_endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL operation and return its `data`.
    ///
    /// Top-level `errors` become `ShopifyError::GraphQL`; mutation
    /// `userErrors` are part of `data` and left to the caller.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T, ShopifyError> {
        let request = GraphQLRequest { query, variables };

        let response = self
            .inner
            .client
            .post(self.inner.graphql_endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.bytes().await?;
        let gql_response: GraphQLResponse<T> = serde_json::from_slice(&body)?;
        gql_response.into_result()
    }

    // =========================================================================
    // REST Execution
    // =========================================================================

    /// POST a JSON body to a legacy REST resource (e.g. `customers.json`).
    ///
    /// The raw response is returned so callers can interpret resource-specific
    /// statuses such as 422.
    async fn rest_post<B: Serialize + Sync>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<Response, ShopifyError> {
        let url = self
            .inner
            .rest_base
            .join(resource)
            .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))?;

        Ok(self.inner.client.post(url).json(body).send().await?)
    }
}

/// Map statuses every endpoint treats the same way; pass the rest through.
async fn check_status(response: Response) -> Result<Response, ShopifyError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map_or(DEFAULT_RETRY_AFTER_SECS, whole_seconds);
        return Err(ShopifyError::RateLimited(retry_after));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ShopifyError::Unauthorized(
            "Invalid or missing Admin API access token".to_string(),
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ShopifyError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Round a fractional `Retry-After` up to whole seconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(secs: f64) -> u64 {
    secs.ceil().max(0.0) as u64
}
