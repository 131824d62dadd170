//! Transaction repository port: non-transactional ledger access.
//!
//! The settlement engine never goes through this port; it uses
//! [`SettlementStore`](super::SettlementStore) so every mutation happens
//! under the row lock. This port serves the read paths around the engine:
//! the idempotency pre-check, invoice creation, and the reconciliation
//! sweep's stuck-transaction query.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, InvoiceId, Timestamp, TransactionId};
use crate::domain::ledger::Transaction;

/// Repository port for the transaction ledger.
///
/// The ledger is append-only: there is no delete, and updates flow through
/// the settlement store only.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Records a freshly created pending transaction.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the invoice id is already recorded
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Finds a transaction by its processor invoice id.
    async fn find_by_invoice_id(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Finds a transaction by its internal id.
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Finds subscriber transactions stuck non-terminal (`Pending` or
    /// `Confirming`) that were created at or after `created_after`.
    ///
    /// This is the reconciliation sweep's work list.
    async fn find_stuck_since(
        &self,
        created_after: Timestamp,
    ) -> Result<Vec<Transaction>, DomainError>;
}
