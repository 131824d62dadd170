//! Reconciliation sweep: the pull path that repairs missed notifications.
//!
//! Webhooks get lost: delivery fails, the service was down, the processor
//! gave up. This sweep polls the processor directly (an independent failure
//! domain from the webhook path) for transactions stuck non-terminal and
//! re-drives the engine with whatever the processor says. The engine's row
//! lock and idempotency make re-driving always safe.

use std::sync::Arc;

use crate::domain::access::AccessActor;
use crate::domain::foundation::Clock;
use crate::domain::ledger::{is_settled_report, map_report};
use crate::domain::settlement::{SettlementEngine, SettlementError};
use crate::ports::{NotificationSink, PaymentProcessor, TransactionRepository};

use super::outbox_relay::OutboxRelay;

/// How far back the sweep looks for stuck transactions.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// Aggregate result of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub examined: u32,
    pub healed: u32,
    pub failed: u32,
}

/// Periodic job reconciling local state with the processor.
pub struct ReconciliationSweeper {
    transactions: Arc<dyn TransactionRepository>,
    processor: Arc<dyn PaymentProcessor>,
    engine: Arc<SettlementEngine>,
    relay: Arc<OutboxRelay>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    lookback_hours: i64,
}

impl ReconciliationSweeper {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        processor: Arc<dyn PaymentProcessor>,
        engine: Arc<SettlementEngine>,
        relay: Arc<OutboxRelay>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        lookback_hours: i64,
    ) -> Self {
        Self {
            transactions,
            processor,
            engine,
            relay,
            sink,
            clock,
            lookback_hours,
        }
    }

    /// Runs one sweep pass. Per-transaction failures are logged and counted,
    /// never abort the sweep.
    pub async fn run_once(&self) -> ReconciliationReport {
        let mut report = ReconciliationReport::default();
        let now = self.clock.now();
        let cutoff = now.minus_secs(self.lookback_hours * 3600);

        let stuck = match self.transactions.find_stuck_since(cutoff).await {
            Ok(stuck) => stuck,
            Err(err) => {
                tracing::error!(error = %err, "reconciliation query failed");
                return report;
            }
        };

        for transaction in stuck {
            report.examined += 1;

            let attempts = match self.processor.fetch_payment(&transaction.invoice_id).await {
                Ok(attempts) => attempts,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        invoice_id = %transaction.invoice_id,
                        error = %err,
                        "processor fetch failed during reconciliation"
                    );
                    continue;
                }
            };

            // Most recent attempt is authoritative.
            let Some(latest) = attempts.last() else {
                tracing::debug!(
                    invoice_id = %transaction.invoice_id,
                    "processor has no attempts for invoice yet"
                );
                continue;
            };

            let disagrees = is_settled_report(&latest.status)
                || map_report(&latest.status) != transaction.status;
            if !disagrees {
                continue;
            }

            match self
                .engine
                .apply(
                    &transaction.invoice_id,
                    &latest.status,
                    latest.actually_paid,
                    &latest.pay_currency,
                    AccessActor::System,
                )
                .await
            {
                Ok(outcome) => {
                    report.healed += 1;
                    tracing::info!(
                        invoice_id = %transaction.invoice_id,
                        outcome = ?outcome,
                        "reconciliation healed transaction"
                    );
                }
                // Underpayment is a heal too: the ledger converged on the
                // processor's authoritative answer.
                Err(SettlementError::Underpaid { .. }) => {
                    report.healed += 1;
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        invoice_id = %transaction.invoice_id,
                        error = %err,
                        "reconciliation failed for transaction"
                    );
                }
            }
        }

        // Deliver any grants the healed settlements enqueued.
        self.relay.drain().await;

        if report.healed + report.failed > 0 {
            let message = format!(
                "Reconciliation sweep: {} healed, {} errors ({} examined)",
                report.healed, report.failed, report.examined
            );
            if let Err(err) = self.sink.notify(&message).await {
                tracing::warn!(error = %err, "failed to report sweep outcome");
            }
        }

        report
    }
}
