//! Integration test harness for the Icecube storefront.
//!
//! Builds the real router in-process and points its Admin API client at a
//! `wiremock` server standing in for Shopify, so a test can script the
//! store's answers and assert on the HTTP response the shopper gets.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p icecube-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use icecube_storefront::config::{ShopifyAdminConfig, StorefrontConfig};
use icecube_storefront::routes;
use icecube_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// Admin API version the harness configures.
pub const API_VERSION: &str = "2024-10";

/// Path of the mocked GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/admin/api/2024-10/graphql.json";

/// Path of the mocked REST customers resource.
pub const REST_CUSTOMERS_PATH: &str = "/admin/api/2024-10/customers.json";

/// Client IP sent with every request so the rate limiter has a key.
const CLIENT_IP: &str = "203.0.113.10";

/// A storefront router plus the mock Shopify it talks to.
pub struct TestApp {
    pub router: Router,
    pub shopify: Option<MockServer>,
}

/// Decoded response from the storefront.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Storefront wired to a fresh mock Shopify.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    pub async fn spawn() -> Self {
        let shopify = MockServer::start().await;
        let config = storefront_config(Some(ShopifyAdminConfig {
            store: shopify.uri(),
            api_version: API_VERSION.to_string(),
            access_token: SecretString::from("shpat_integration_token"),
            timeout: Duration::from_secs(2),
        }));

        Self {
            router: router_for(config),
            shopify: Some(shopify),
        }
    }

    /// Storefront without Admin API credentials (logged-only signups).
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn without_credentials() -> Self {
        Self {
            router: router_for(storefront_config(None)),
            shopify: None,
        }
    }

    /// The mock Shopify server.
    ///
    /// # Panics
    ///
    /// Panics if the app was built without credentials.
    #[must_use]
    pub fn shopify(&self) -> &MockServer {
        self.shopify
            .as_ref()
            .expect("app was built without a mock Shopify")
    }

    /// POST a raw body to the newsletter endpoint.
    pub async fn post_newsletter(&self, body: &str) -> TestResponse {
        self.request(Method::POST, "/api/newsletter", Body::from(body.to_string()))
            .await
    }

    /// POST `{"email": email}` to the newsletter endpoint.
    pub async fn subscribe(&self, email: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email }).to_string();
        self.post_newsletter(&body).await
    }

    /// Send a request through the full middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(&self, method: Method, uri: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", CLIENT_IP)
            .body(body)
            .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        decode(response).await
    }
}

fn storefront_config(shopify_admin: Option<ShopifyAdminConfig>) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shopify_admin,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn router_for(config: StorefrontConfig) -> Router {
    let state = AppState::new(config).expect("application state builds");
    routes::app(state)
}

async fn decode(response: Response<Body>) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("readable body");

    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse {
        status,
        headers,
        body,
    }
}
