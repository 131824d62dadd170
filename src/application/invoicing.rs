//! Invoice lifecycle entry points exposed to collaborators.
//!
//! The invoice-request flow (bot UX, admin screens) depends on a pending
//! ledger row the core owns, and the admin override must route through the
//! settlement engine rather than around it: those are the two operations
//! here.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::access::AccessActor;
use crate::domain::foundation::{AdminId, Clock, DomainError, PlanId, TransactionId};
use crate::domain::ledger::{Payee, Transaction};
use crate::domain::settlement::{ApplyOutcome, SettlementEngine, SettlementError};
use crate::ports::{
    InvoiceRequest, IssuedInvoice, PaymentProcessor, PlanCatalog, TransactionRepository,
};

use super::outbox_relay::OutboxRelay;

/// Errors from invoicing operations.
#[derive(Debug, Error)]
pub enum InvoicingError {
    #[error("plan not found: {0}")]
    PlanNotFound(PlanId),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error(transparent)]
    Processor(#[from] crate::ports::ProcessorError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Invoice creation and the admin override path.
pub struct InvoiceService {
    processor: Arc<dyn PaymentProcessor>,
    transactions: Arc<dyn TransactionRepository>,
    plans: Arc<dyn PlanCatalog>,
    engine: Arc<SettlementEngine>,
    relay: Arc<OutboxRelay>,
    clock: Arc<dyn Clock>,
}

impl InvoiceService {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        transactions: Arc<dyn TransactionRepository>,
        plans: Arc<dyn PlanCatalog>,
        engine: Arc<SettlementEngine>,
        relay: Arc<OutboxRelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            processor,
            transactions,
            plans,
            engine,
            relay,
            clock,
        }
    }

    /// Requests an invoice from the processor and records the pending
    /// transaction the webhook/reconciliation paths will later settle.
    pub async fn create_pending(
        &self,
        payee: Payee,
        plan_id: PlanId,
    ) -> Result<IssuedInvoice, InvoicingError> {
        let plan = self
            .plans
            .find(&plan_id)
            .await?
            .ok_or(InvoicingError::PlanNotFound(plan_id))?;

        let issued = self
            .processor
            .create_invoice(InvoiceRequest {
                amount: plan.price,
                currency: plan.currency.clone(),
                order_id: format!("{}:{}", payee.kind.as_str(), payee.id),
            })
            .await?;

        let transaction = Transaction::pending(
            issued.invoice_id.clone(),
            payee,
            plan_id,
            plan.price,
            plan.currency,
            issued.expires_at,
            self.clock.now(),
        );
        self.transactions.insert(&transaction).await?;

        tracing::info!(
            invoice_id = %issued.invoice_id,
            payee_id = %payee.id,
            %plan_id,
            "pending transaction recorded"
        );
        Ok(issued)
    }

    /// Admin override: settles a transaction as if the processor reported
    /// full payment. Routes through the engine, so the row lock and the
    /// forward-only status machine still hold.
    pub async fn manual_override(
        &self,
        transaction_id: TransactionId,
        admin_id: AdminId,
    ) -> Result<ApplyOutcome, InvoicingError> {
        let transaction = self
            .transactions
            .find_by_id(&transaction_id)
            .await?
            .ok_or(InvoicingError::TransactionNotFound(transaction_id))?;

        tracing::info!(
            %admin_id,
            %transaction_id,
            invoice_id = %transaction.invoice_id,
            "manual settlement override"
        );

        let outcome = self
            .engine
            .apply(
                &transaction.invoice_id,
                "finished",
                transaction.amount,
                &transaction.currency,
                AccessActor::Admin,
            )
            .await?;

        if outcome.is_confirmation() {
            self.relay.drain().await;
        }
        Ok(outcome)
    }
}
