//! End-to-end tests for `POST /api/newsletter` against a mocked Shopify.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, StatusCode};
use icecube_integration_tests::{GRAPHQL_PATH, REST_CUSTOMERS_PATH, TestApp};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

fn customer_created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {
            "customerCreate": {
                "customer": { "id": id, "email": "new@example.com" },
                "userErrors": []
            }
        }
    }))
}

fn email_taken() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {
            "customerCreate": {
                "customer": null,
                "userErrors": [{ "field": ["email"], "message": "Email has already been taken" }]
            }
        }
    }))
}

fn customer_found(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {
            "customers": {
                "edges": [{ "node": { "id": id, "email": "dup@example.com" } }]
            }
        }
    }))
}

fn consent_updated(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {
            "customerEmailMarketingConsentUpdate": {
                "customer": { "id": id },
                "userErrors": []
            }
        }
    }))
}

fn graphql(operation: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(operation))
}

#[tokio::test]
async fn new_subscriber_is_created() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(customer_created("gid://shopify/Customer/1"))
        .expect(1)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("new@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Thanks for subscribing!" })
    );
}

#[tokio::test]
async fn duplicate_subscriber_gets_consent_updated() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(email_taken())
        .expect(1)
        .mount(app.shopify())
        .await;
    graphql("customers(first: 1")
        .and(body_string_contains(r#"email:\"dup@example.com\""#))
        .respond_with(customer_found("gid://shopify/Customer/123"))
        .expect(1)
        .mount(app.shopify())
        .await;
    graphql("customerEmailMarketingConsentUpdate")
        .and(body_string_contains("gid://shopify/Customer/123"))
        .respond_with(consent_updated("gid://shopify/Customer/123"))
        .expect(1)
        .mount(app.shopify())
        .await;
    Mock::given(path(REST_CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("dup@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));
}

#[tokio::test]
async fn duplicate_subscriber_succeeds_when_update_fails() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(email_taken())
        .mount(app.shopify())
        .await;
    graphql("customers(first: 1")
        .respond_with(customer_found("gid://shopify/Customer/123"))
        .mount(app.shopify())
        .await;
    graphql("customerEmailMarketingConsentUpdate")
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("dup@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Thanks! You're now subscribed!" })
    );
}

#[tokio::test]
async fn invalid_email_is_rejected_without_calling_shopify() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("bad-email").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "success": false,
            "error": "Please enter a valid email address",
            "errorCode": "INVALID_EMAIL"
        })
    );
}

#[tokio::test]
async fn missing_email_is_required() {
    let app = TestApp::spawn().await;

    let response = app.post_newsletter("{}").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("Email is required"));
    assert_eq!(response.body["errorCode"], json!("INVALID_EMAIL"));
}

#[tokio::test]
async fn blank_email_is_required() {
    let app = TestApp::spawn().await;

    let response = app.subscribe("   ").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("Email is required"));
}

#[tokio::test]
async fn both_create_surfaces_failing_is_reported() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(app.shopify())
        .await;
    Mock::given(method("POST"))
        .and(path(REST_CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("new@example.com").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({
            "success": false,
            "error": "Failed to subscribe. Please try again.",
            "errorCode": "SUBSCRIBE_FAILED"
        })
    );
}

#[tokio::test]
async fn rest_fallback_creates_and_normalizes_consent() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Internal error. Looks like something went wrong on our end." }]
        })))
        .expect(1)
        .mount(app.shopify())
        .await;
    Mock::given(method("POST"))
        .and(path(REST_CUSTOMERS_PATH))
        .and(body_string_contains(r#""accepts_marketing":true"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "customer": { "id": 555, "email": "new@example.com" }
        })))
        .expect(1)
        .mount(app.shopify())
        .await;
    graphql("customerEmailMarketingConsentUpdate")
        .and(body_string_contains("gid://shopify/Customer/555"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("new@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], json!("Thanks for subscribing!"));
}

#[tokio::test]
async fn create_without_customer_falls_back_to_rest() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "customerCreate": { "customer": null, "userErrors": [] } }
        })))
        .expect(1)
        .mount(app.shopify())
        .await;
    Mock::given(method("POST"))
        .and(path(REST_CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(app.shopify())
        .await;
    graphql("customerEmailMarketingConsentUpdate")
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("new@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Thanks for subscribing!" })
    );
}

#[tokio::test]
async fn rest_conflict_resolves_existing_customer() {
    let app = TestApp::spawn().await;
    graphql("customerCreate")
        .respond_with(ResponseTemplate::new(500))
        .mount(app.shopify())
        .await;
    Mock::given(method("POST"))
        .and(path(REST_CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": { "email": ["has already been taken"] }
        })))
        .expect(1)
        .mount(app.shopify())
        .await;
    graphql("customers(first: 1")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "customers": { "edges": [] } }
        })))
        .expect(1)
        .mount(app.shopify())
        .await;

    let response = app.subscribe("dup@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Thanks! You're now subscribed!" })
    );
}

#[tokio::test]
async fn missing_credentials_logs_only() {
    let app = TestApp::without_credentials();

    let response = app.subscribe("new@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Thanks for subscribing! (Email logged)" })
    );
}

#[tokio::test]
async fn undecodable_body_is_unexpected_error() {
    let app = TestApp::spawn().await;

    let response = app.post_newsletter("not json").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({
            "success": false,
            "error": "An unexpected error occurred. Please try again later.",
            "errorCode": "UNEXPECTED_ERROR"
        })
    );
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let app = TestApp::without_credentials();

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let response = app.request(method, "/api/newsletter", Body::empty()).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.body, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn signups_are_rate_limited_per_ip() {
    let app = TestApp::without_credentials();

    for _ in 0..5 {
        let response = app.subscribe("bad-email").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = app.subscribe("bad-email").await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let app = TestApp::spawn().await;

    let response = app.subscribe("bad-email").await;

    let csp = response.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains(&format!("connect-src 'self' {}", app.shopify().uri())));
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn health_endpoints() {
    let configured = TestApp::spawn().await;
    let response = configured
        .request(Method::GET, "/health", Body::empty())
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));

    let ready = configured
        .request(Method::GET, "/health/ready", Body::empty())
        .await;
    assert_eq!(ready.body, json!("ready"));

    let degraded = TestApp::without_credentials()
        .request(Method::GET, "/health/ready", Body::empty())
        .await;
    assert_eq!(degraded.status, StatusCode::OK);
    assert_eq!(degraded.body, json!("degraded"));
}
