//! Settlement engine errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::foundation::{DomainError, InvoiceId, PlanId};

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    /// No ledger row for the invoice; nothing was mutated.
    #[error("unknown invoice: {0}")]
    UnknownInvoice(InvoiceId),

    /// Settled report did not cover the amount due. The transaction was
    /// recorded `Failed`; the subscription was not touched. Recovery is a
    /// new invoice, never a retry of this one.
    #[error("underpaid: expected {expected}, received {received}")]
    Underpaid { expected: Decimal, received: Decimal },

    /// A confirmed transaction references a plan the catalog no longer has.
    /// The whole attempt rolls back.
    #[error("plan {0} missing for confirmed transaction")]
    PlanMissing(PlanId),

    /// Storage failure mid-transition; the attempt rolled back atomically
    /// and is safe to retry via redelivery or reconciliation.
    #[error(transparent)]
    Storage(#[from] DomainError),
}
