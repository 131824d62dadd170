//! PostgreSQL implementation of the transaction repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, TransactionId};
use crate::domain::ledger::Transaction;
use crate::ports::TransactionRepository;

use super::rows::TransactionRow;

const SELECT_COLUMNS: &str = r#"
    SELECT id, invoice_id, payee_kind, payee_id, plan_id, amount, currency,
           status, confirmed_at, expires_at, created_at, updated_at
    FROM transactions
"#;

/// PostgreSQL transaction repository.
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_id, payee_kind, payee_id, plan_id, amount, currency,
                status, confirmed_at, expires_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.invoice_id.as_str())
        .bind(transaction.payee.kind.as_str())
        .bind(transaction.payee.id)
        .bind(transaction.plan_id.as_uuid())
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.status.as_str())
        .bind(transaction.confirmed_at.map(|t| *t.as_datetime()))
        .bind(transaction.expires_at.as_datetime())
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("transactions_invoice_id_key") {
                    return DomainError::new(
                        ErrorCode::ValidationFailed,
                        format!("Invoice {} already recorded", transaction.invoice_id),
                    );
                }
            }
            DomainError::database(format!("Failed to insert transaction: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE invoice_id = $1", SELECT_COLUMNS))
                .bind(invoice_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to find transaction: {}", e))
                })?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to find transaction: {}", e))
                })?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_stuck_since(
        &self,
        created_after: Timestamp,
    ) -> Result<Vec<Transaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            r#"{}
            WHERE status IN ('pending', 'confirming')
              AND payee_kind = 'subscriber'
              AND created_at >= $1
            ORDER BY created_at ASC
            "#,
            SELECT_COLUMNS
        ))
        .bind(created_after.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to query stuck transactions: {}", e)))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
