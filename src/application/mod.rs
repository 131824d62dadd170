//! Application services wiring the domain to the ports.

pub mod access_control;
pub mod expiration;
pub mod invoicing;
pub mod moderation;
pub mod outbox_relay;
pub mod reconciliation;
pub mod retry;
pub mod webhook_ingest;

pub use access_control::{AccessControlEngine, AccessControlError, JoinDecision};
pub use expiration::{ExpirationReport, ExpirationSweep};
pub use invoicing::{InvoiceService, InvoicingError};
pub use moderation::ModerationService;
pub use outbox_relay::{DrainReport, OutboxRelay, MAX_DELIVERY_ATTEMPTS};
pub use reconciliation::{ReconciliationReport, ReconciliationSweeper, DEFAULT_LOOKBACK_HOURS};
pub use retry::{RetryDecision, RetryPolicy, Retryable};
pub use webhook_ingest::{IngestOutcome, WebhookIngest};
