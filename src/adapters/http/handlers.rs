//! HTTP handlers.
//!
//! The webhook handler takes the body as raw bytes: the signature covers
//! the exact bytes the processor sent, so nothing may parse or re-serialize
//! before verification.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::application::IngestOutcome;

use super::app_state::AppState;

/// Header carrying the hex HMAC-SHA512 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// `POST /webhooks/payment`: processor notification intake.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state.ingest.handle(&body, signature).await;
    respond(outcome)
}

/// `GET /health`: liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn respond(outcome: IngestOutcome) -> (StatusCode, Json<serde_json::Value>) {
    // Every handled outcome is a 200 so the processor stops redelivering;
    // only rejections and internal failures use error statuses.
    let (status, result) = match outcome {
        IngestOutcome::Processed(_) => (StatusCode::OK, "processed"),
        IngestOutcome::AlreadyProcessed => (StatusCode::OK, "already_processed"),
        IngestOutcome::Underpaid => (StatusCode::OK, "underpaid"),
        IngestOutcome::UnknownInvoice => (StatusCode::OK, "unknown_invoice"),
        IngestOutcome::Stale => (StatusCode::BAD_REQUEST, "stale"),
        IngestOutcome::Malformed => (StatusCode::BAD_REQUEST, "malformed"),
        IngestOutcome::BadSignature => (StatusCode::FORBIDDEN, "bad_signature"),
        IngestOutcome::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (status, Json(serde_json::json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handled_outcomes_map_to_200() {
        assert_eq!(respond(IngestOutcome::AlreadyProcessed).0, StatusCode::OK);
        assert_eq!(respond(IngestOutcome::Underpaid).0, StatusCode::OK);
        assert_eq!(respond(IngestOutcome::UnknownInvoice).0, StatusCode::OK);
    }

    #[test]
    fn rejections_map_to_client_errors() {
        assert_eq!(respond(IngestOutcome::Stale).0, StatusCode::BAD_REQUEST);
        assert_eq!(respond(IngestOutcome::Malformed).0, StatusCode::BAD_REQUEST);
        assert_eq!(respond(IngestOutcome::BadSignature).0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_failures_map_to_500() {
        assert_eq!(
            respond(IngestOutcome::Internal).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
