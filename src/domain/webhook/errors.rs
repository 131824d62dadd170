//! Errors raised while validating an inbound payment notification.
//!
//! All of these fire before any mutation: a rejected notification leaves the
//! ledger untouched and the processor free to redeliver.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// Signature missing, malformed, or not matching the raw body.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Self-reported update time is older than the acceptance window.
    #[error("stale notification: updated {age_secs}s ago, window is {window_secs}s")]
    Stale { age_secs: i64, window_secs: i64 },

    /// Body is not a parseable notification.
    #[error("malformed notification payload: {0}")]
    Malformed(String),
}
