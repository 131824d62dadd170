//! PostgreSQL implementation of the settlement store.
//!
//! One `PgSettlementTxn` is one `BEGIN ... COMMIT` block. The ledger row is
//! taken with `SELECT ... FOR UPDATE`, which serializes the webhook handler
//! and the reconciliation sweep for a single invoice while letting other
//! invoices proceed in parallel. Dropping the transaction without commit
//! rolls everything back (sqlx issues the ROLLBACK on drop).

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::domain::access::AccessTask;
use crate::domain::foundation::{Clock, DomainError, ErrorCode, InvoiceId, PlanId};
use crate::domain::ledger::{Payee, Transaction};
use crate::domain::subscription::{Plan, Subscription};
use crate::ports::{SettlementStore, SettlementTxn};

use super::rows::{PlanRow, SubscriptionRow, TransactionRow};

/// PostgreSQL settlement store.
pub struct PgSettlementStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgSettlementStore {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl SettlementStore for PgSettlementStore {
    async fn begin(&self) -> Result<Box<dyn SettlementTxn>, DomainError> {
        let txn = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;
        Ok(Box::new(PgSettlementTxn {
            txn,
            clock: self.clock.clone(),
        }))
    }
}

struct PgSettlementTxn {
    txn: SqlxTransaction<'static, Postgres>,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl SettlementTxn for PgSettlementTxn {
    async fn lock_transaction(
        &mut self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, payee_kind, payee_id, plan_id, amount, currency,
                   status, confirmed_at, expires_at, created_at, updated_at
            FROM transactions
            WHERE invoice_id = $1
            FOR UPDATE
            "#,
        )
        .bind(invoice_id.as_str())
        .fetch_optional(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to lock transaction: {}", e)))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn load_plan(&mut self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, channel_id, duration_days, price, currency
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id.as_uuid())
        .fetch_optional(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load plan: {}", e)))?;

        Ok(row.map(Plan::from))
    }

    async fn load_subscription(
        &mut self,
        payee: &Payee,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT payee_kind, payee_id, status, plan_id, chat_user_id,
                   period_start, period_end, created_at, updated_at
            FROM subscriptions
            WHERE payee_kind = $1 AND payee_id = $2
            "#,
        )
        .bind(payee.kind.as_str())
        .bind(payee.id)
        .fetch_optional(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load subscription: {}", e)))?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                status = $2,
                confirmed_at = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.status.as_str())
        .bind(transaction.confirmed_at.map(|t| *t.as_datetime()))
        .bind(transaction.updated_at.as_datetime())
        .execute(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update transaction: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Transaction row vanished during settlement",
            ));
        }
        Ok(())
    }

    async fn save_subscription(
        &mut self,
        payee: &Payee,
        subscription: &Subscription,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                payee_kind, payee_id, status, plan_id, chat_user_id,
                period_start, period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (payee_kind, payee_id) DO UPDATE SET
                status = EXCLUDED.status,
                plan_id = EXCLUDED.plan_id,
                chat_user_id = COALESCE(EXCLUDED.chat_user_id, subscriptions.chat_user_id),
                period_start = EXCLUDED.period_start,
                period_end = EXCLUDED.period_end,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(payee.kind.as_str())
        .bind(payee.id)
        .bind(subscription.status.as_str())
        .bind(subscription.plan_id.as_uuid())
        .bind(subscription.chat_user_id.map(|u| u.as_i64()))
        .bind(subscription.period_start.as_datetime())
        .bind(subscription.period_end.as_datetime())
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save subscription: {}", e)))?;

        Ok(())
    }

    async fn enqueue_task(&mut self, task: &AccessTask) -> Result<(), DomainError> {
        let payload = serde_json::to_value(task).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Failed to serialize access task: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO access_outbox (id, task, status, attempts, created_at)
            VALUES ($1, $2, 'pending', 0, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload)
        .bind(self.clock.now().as_datetime())
        .execute(&mut *self.txn)
        .await
        .map_err(|e| DomainError::database(format!("Failed to enqueue access task: {}", e)))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.txn
            .commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit settlement: {}", e)))
    }
}
