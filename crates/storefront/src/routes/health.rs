//! Health check endpoints.

use axum::extract::State;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Always 200: a missing Admin API configuration degrades signups to
/// logged-only mode but the service still answers. The body says which.
pub async fn readiness(State(state): State<AppState>) -> &'static str {
    if state.newsletter().is_configured() {
        "ready"
    } else {
        "degraded"
    }
}
