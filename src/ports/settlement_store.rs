//! Settlement storage port: the engine's single transactional boundary.
//!
//! Everything the settlement engine touches for one invoice happens inside
//! one `SettlementTxn`: lock the ledger row, read the plan and subscription,
//! write the updates, enqueue the side-effect task, commit. Dropping a
//! transaction without committing rolls the whole attempt back, so partial
//! application is never observable.
//!
//! Concurrency correctness lives here: `lock_transaction` takes an exclusive
//! storage-level lock on the ledger row (row lock, not an application
//! mutex), serializing the webhook path and the reconciliation sweep for one
//! invoice while leaving other invoices fully parallel.

use async_trait::async_trait;

use crate::domain::access::AccessTask;
use crate::domain::foundation::{DomainError, InvoiceId, PlanId};
use crate::domain::ledger::{Payee, Transaction};
use crate::domain::subscription::{Plan, Subscription};

/// Factory for settlement transactions.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Opens a new transactional unit of work.
    async fn begin(&self) -> Result<Box<dyn SettlementTxn>, DomainError>;
}

/// One atomic settlement attempt.
///
/// Implementations must roll back all writes if the transaction is dropped
/// without `commit`.
#[async_trait]
pub trait SettlementTxn: Send {
    /// Loads the transaction for `invoice_id` under an exclusive row lock,
    /// blocking concurrent settlement attempts for the same invoice until
    /// this transaction completes. Returns `None` if the invoice is unknown.
    async fn lock_transaction(
        &mut self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Loads the plan a transaction references.
    async fn load_plan(&mut self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError>;

    /// Loads the payee's subscription facet.
    async fn load_subscription(
        &mut self,
        payee: &Payee,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Persists the mutated transaction row.
    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Persists the payee's subscription facet, creating it if absent.
    async fn save_subscription(
        &mut self,
        payee: &Payee,
        subscription: &Subscription,
    ) -> Result<(), DomainError>;

    /// Enqueues a membership side effect, delivered after commit by the
    /// outbox relay. The audit entry is written at delivery time, so the
    /// trail records performed side effects, not intentions.
    async fn enqueue_task(&mut self, task: &AccessTask) -> Result<(), DomainError>;

    /// Commits every write performed through this transaction.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
