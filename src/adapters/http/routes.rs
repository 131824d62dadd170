//! Axum router.
//!
//! The webhook route is unauthenticated at the HTTP layer: the HMAC
//! signature over the raw body is the authentication.

use axum::routing::{get, post};
use axum::Router;

use super::app_state::AppState;
use super::handlers::{handle_payment_webhook, health};

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/payment", post(handle_payment_webhook))
        .route("/health", get(health))
        .with_state(state)
}
