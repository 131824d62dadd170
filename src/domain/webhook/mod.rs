//! Inbound webhook validation: wire format, signature, and replay guard.

mod errors;
mod notification;
mod replay;
mod signature;

pub use errors::WebhookError;
pub use notification::PaymentNotification;
pub use replay::{ReplayGuard, DEFAULT_WINDOW_SECS};
pub use signature::{compute_signature, SignatureVerifier};
