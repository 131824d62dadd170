//! Transaction aggregate: one row per payment attempt.
//!
//! The ledger is append-only history: transactions are created when an
//! invoice is requested, mutated only by the settlement engine, and never
//! deleted. A failed or expired transaction stays in place; paying again
//! means a new invoice and a new row.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, InvoiceId, PlanId, StateMachine, Timestamp, TransactionId,
};

use super::{Payee, TransactionStatus};

/// A single payment attempt against a processor invoice.
///
/// # Invariants
///
/// - `invoice_id` is unique across the ledger (the idempotency key).
/// - `status` only moves forward; `Confirmed` is terminal.
/// - `confirmed_at` is set exactly when the status becomes `Confirmed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Processor-issued invoice id, unique per transaction.
    pub invoice_id: InvoiceId,
    /// Account the payment credits.
    pub payee: Payee,
    /// Plan the payment buys.
    pub plan_id: PlanId,
    /// Amount due, in `currency`.
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    /// Set exactly once, when the transaction confirms.
    pub confirmed_at: Option<Timestamp>,
    /// When the processor invoice lapses.
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transaction {
    /// Creates a pending transaction for a freshly requested invoice.
    pub fn pending(
        invoice_id: InvoiceId,
        payee: Payee,
        plan_id: PlanId,
        amount: Decimal,
        currency: impl Into<String>,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            invoice_id,
            payee,
            plan_id,
            amount,
            currency: currency.into(),
            status: TransactionStatus::Pending,
            confirmed_at: None,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the transaction has settled.
    pub fn is_confirmed(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }

    /// True if `paid` does not cover the amount due.
    pub fn is_underpaid(&self, paid: Decimal) -> bool {
        paid < self.amount
    }

    /// Moves the transaction to `Confirmed` and stamps `confirmed_at`.
    pub fn confirm(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(TransactionStatus::Confirmed)?;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Moves the transaction to `Failed`.
    pub fn fail(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(TransactionStatus::Failed)?;
        self.updated_at = now;
        Ok(())
    }

    /// Records a non-settlement status reported by the processor.
    pub fn record_status(
        &mut self,
        status: TransactionStatus,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.transition_to(status)?;
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: TransactionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot move transaction {} from {:?} to {:?}",
                    self.invoice_id, self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubscriberId;
    use std::str::FromStr;

    fn base_time() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn pending_transaction() -> Transaction {
        Transaction::pending(
            InvoiceId::new("inv_100").unwrap(),
            Payee::subscriber(SubscriberId::new()),
            PlanId::new(),
            Decimal::from_str("25.00").unwrap(),
            "usd",
            base_time().add_days(1),
            base_time(),
        )
    }

    #[test]
    fn pending_transaction_starts_unconfirmed() {
        let tx = pending_transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.confirmed_at.is_none());
        assert!(!tx.is_confirmed());
    }

    #[test]
    fn confirm_stamps_confirmed_at() {
        let mut tx = pending_transaction();
        let now = base_time().plus_secs(120);

        tx.confirm(now).unwrap();

        assert!(tx.is_confirmed());
        assert_eq!(tx.confirmed_at, Some(now));
        assert_eq!(tx.updated_at, now);
    }

    #[test]
    fn confirm_twice_is_rejected() {
        let mut tx = pending_transaction();
        tx.confirm(base_time()).unwrap();

        let err = tx.confirm(base_time()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn failed_transaction_cannot_confirm() {
        let mut tx = pending_transaction();
        tx.fail(base_time()).unwrap();

        assert!(tx.confirm(base_time()).is_err());
        assert_eq!(tx.status, TransactionStatus::Failed);
    }

    #[test]
    fn underpayment_check_uses_amount_due() {
        let tx = pending_transaction();
        assert!(tx.is_underpaid(Decimal::from_str("24.99").unwrap()));
        assert!(!tx.is_underpaid(Decimal::from_str("25.00").unwrap()));
        assert!(!tx.is_underpaid(Decimal::from_str("25.01").unwrap()));
    }

    #[test]
    fn record_status_moves_through_confirming() {
        let mut tx = pending_transaction();
        let now = base_time().plus_secs(60);

        tx.record_status(TransactionStatus::Confirming, now).unwrap();
        assert_eq!(tx.status, TransactionStatus::Confirming);

        // Repeated report of the same status persists without error.
        tx.record_status(TransactionStatus::Confirming, now.plus_secs(30))
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Confirming);
    }
}
