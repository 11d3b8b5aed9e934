//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/newsletter  - Newsletter signup (rate limited; other methods 405)
//! GET  /health          - Liveness
//! GET  /health/ready    - Readiness ("ready" or "degraded")
//! ```

pub mod health;
pub mod newsletter;

use std::any::Any;
use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    newsletter_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the full application router, middleware included.
pub fn app(state: AppState) -> Router {
    let newsletter_route = post(newsletter::subscribe)
        .fallback(newsletter::method_not_allowed)
        .layer(newsletter_rate_limiter());

    Router::new()
        .route("/api/newsletter", newsletter_route)
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Turn a handler panic into the generic unexpected-error response.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic".to_string());

    AppError::Panic(detail).into_response()
}
