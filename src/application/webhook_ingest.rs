//! Webhook ingestion: the push path from the processor into the engine.
//!
//! Order matters: signature first (authenticates the bytes), then parse,
//! then the replay guard, then a cheap idempotency pre-check, and only then
//! the engine with its row lock. Everything before the engine is rejection
//! without mutation.

use std::sync::Arc;

use crate::domain::access::AccessActor;
use crate::domain::foundation::Clock;
use crate::domain::settlement::{ApplyOutcome, SettlementEngine, SettlementError};
use crate::domain::webhook::{PaymentNotification, ReplayGuard, SignatureVerifier, WebhookError};
use crate::ports::TransactionRepository;

use super::outbox_relay::OutboxRelay;

/// Outcome of handling one webhook delivery, mapped by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Engine ran; the delivery changed (or legitimately recorded) state.
    Processed(ApplyOutcome),
    /// The transaction had already settled; no-op.
    AlreadyProcessed,
    /// Settled report under the amount due; transaction recorded `Failed`.
    Underpaid,
    /// No ledger row for the invoice; acknowledged so the processor stops
    /// redelivering, logged for investigation.
    UnknownInvoice,
    /// Signature missing or wrong for the raw body.
    BadSignature,
    /// Notification older than the replay window.
    Stale,
    /// Body failed to parse after a valid signature.
    Malformed,
    /// Storage or mid-transition failure; the attempt rolled back and the
    /// processor should redeliver.
    Internal,
}

/// Webhook ingestion service.
pub struct WebhookIngest {
    verifier: SignatureVerifier,
    replay: ReplayGuard,
    transactions: Arc<dyn TransactionRepository>,
    engine: Arc<SettlementEngine>,
    relay: Arc<OutboxRelay>,
    clock: Arc<dyn Clock>,
}

impl WebhookIngest {
    pub fn new(
        verifier: SignatureVerifier,
        replay: ReplayGuard,
        transactions: Arc<dyn TransactionRepository>,
        engine: Arc<SettlementEngine>,
        relay: Arc<OutboxRelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            replay,
            transactions,
            engine,
            relay,
            clock,
        }
    }

    /// Handles one webhook delivery: the exact raw bytes plus the signature
    /// header value, if any.
    pub async fn handle(&self, raw_body: &[u8], signature: Option<&str>) -> IngestOutcome {
        if self.verifier.verify(raw_body, signature).is_err() {
            tracing::warn!("webhook rejected: bad signature");
            return IngestOutcome::BadSignature;
        }

        let notification = match PaymentNotification::parse(raw_body) {
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(error = %err, "webhook rejected: malformed body");
                return IngestOutcome::Malformed;
            }
        };

        let now = self.clock.now();
        if let Err(WebhookError::Stale { age_secs, .. }) =
            self.replay.check(notification.updated_at_ts(), now)
        {
            tracing::warn!(age_secs, "webhook rejected: stale notification");
            return IngestOutcome::Stale;
        }

        let invoice_id = match notification.invoice_id() {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(error = %err, "webhook rejected: bad invoice id");
                return IngestOutcome::Malformed;
            }
        };

        // Cheap read-path duplicate check; the engine's row lock remains the
        // authoritative guard.
        match self.transactions.find_by_invoice_id(&invoice_id).await {
            Ok(Some(tx)) if tx.is_confirmed() => {
                tracing::debug!(%invoice_id, "duplicate delivery for settled transaction");
                return IngestOutcome::AlreadyProcessed;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(%invoice_id, error = %err, "idempotency pre-check failed");
                return IngestOutcome::Internal;
            }
        }

        match self
            .engine
            .apply(
                &invoice_id,
                &notification.payment_status,
                notification.actually_paid,
                &notification.pay_currency,
                AccessActor::System,
            )
            .await
        {
            Ok(ApplyOutcome::AlreadyConfirmed) => IngestOutcome::AlreadyProcessed,
            Ok(outcome) => {
                if outcome.is_confirmation() {
                    // Best-effort immediate delivery; the periodic relay
                    // pass catches anything this misses.
                    self.relay.drain().await;
                }
                IngestOutcome::Processed(outcome)
            }
            Err(SettlementError::UnknownInvoice(id)) => {
                tracing::warn!(invoice_id = %id, "notification for unknown invoice");
                IngestOutcome::UnknownInvoice
            }
            Err(SettlementError::Underpaid { expected, received }) => {
                tracing::warn!(%invoice_id, %expected, %received, "underpaid settlement recorded");
                IngestOutcome::Underpaid
            }
            Err(err) => {
                tracing::error!(%invoice_id, error = %err, "settlement failed");
                IngestOutcome::Internal
            }
        }
    }
}
