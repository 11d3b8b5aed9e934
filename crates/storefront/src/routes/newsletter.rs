//! Newsletter subscription route handler.
//!
//! `POST /api/newsletter` with `{"email": "..."}`. The signup flow itself
//! lives in [`crate::services::newsletter`]; this module only maps its
//! result onto HTTP.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use icecube_core::{SubscriptionErrorCode, SubscriptionResult};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Newsletter subscription request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// A missing or null email is treated as empty.
    #[serde(default)]
    pub email: Option<String>,
}

/// JSON body returned by the newsletter endpoint.
///
/// Successes carry `message`; failures carry the same text as `error`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SubscriptionErrorCode>,
}

impl From<SubscriptionResult> for SignupResponse {
    fn from(result: SubscriptionResult) -> Self {
        if result.success {
            Self {
                success: true,
                message: result.message,
                error: None,
                error_code: None,
            }
        } else {
            Self {
                success: false,
                message: None,
                error: result.message,
                error_code: result.error_code,
            }
        }
    }
}

/// Subscribe an email address to the newsletter.
///
/// The body is decoded by hand rather than with the `Json` extractor so a
/// missing `Content-Type` is accepted; any body that is not the expected
/// JSON object is an unexpected error.
///
/// # Errors
///
/// Returns `AppError::InvalidBody` if the body cannot be decoded.
#[instrument(skip_all, fields(email = tracing::field::Empty))]
pub async fn subscribe(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request: SubscribeRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    let email = request.email.unwrap_or_default();
    tracing::Span::current().record("email", email.trim());

    let result = state.newsletter().subscribe(&email).await;
    let status = status_for(&result);

    Ok((status, Json(SignupResponse::from(result))).into_response())
}

/// 405 for any method other than POST.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

fn status_for(result: &SubscriptionResult) -> StatusCode {
    match result.error_code {
        None => StatusCode::OK,
        Some(SubscriptionErrorCode::InvalidEmail) => StatusCode::BAD_REQUEST,
        Some(SubscriptionErrorCode::SubscribeFailed | SubscriptionErrorCode::UnexpectedError) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use icecube_core::{EmailError, MSG_SUBSCRIBED};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_email_optional() {
        let missing: SubscribeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.email, None);

        let null: SubscribeRequest = serde_json::from_str(r#"{"email":null}"#).unwrap();
        assert_eq!(null.email, None);

        assert!(serde_json::from_str::<SubscribeRequest>(r#"{"email":42}"#).is_err());
    }

    #[test]
    fn test_status_for() {
        assert_eq!(
            status_for(&SubscriptionResult::subscribed(MSG_SUBSCRIBED)),
            StatusCode::OK
        );
        assert_eq!(
            status_for(&SubscriptionResult::invalid_email(&EmailError::Empty)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SubscriptionResult::subscribe_failed()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&SubscriptionResult::unexpected()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_signup_response_shapes() {
        let ok = serde_json::to_value(SignupResponse::from(SubscriptionResult::subscribed(
            MSG_SUBSCRIBED,
        )))
        .unwrap();
        assert_eq!(
            ok,
            json!({"success": true, "message": "Thanks for subscribing!"})
        );

        let invalid = serde_json::to_value(SignupResponse::from(
            SubscriptionResult::invalid_email(&EmailError::MissingAtSymbol),
        ))
        .unwrap();
        assert_eq!(
            invalid,
            json!({
                "success": false,
                "error": "Please enter a valid email address",
                "errorCode": "INVALID_EMAIL"
            })
        );
    }
}
