//! Unified error handling with Sentry integration.
//!
//! Signup outcomes, including failures, are ordinary `SubscriptionResult`
//! values. `AppError` covers what falls outside the signup flow: a body that
//! cannot be decoded, or a panic while handling the request. Both are
//! captured to Sentry and answered with the same generic 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use icecube_core::SubscriptionResult;
use thiserror::Error;

use crate::routes::newsletter::SignupResponse;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body was not the expected JSON.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A handler panicked.
    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        // Don't expose internal error details to clients
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SignupResponse::from(SubscriptionResult::unexpected())),
        )
            .into_response()
    }
}
