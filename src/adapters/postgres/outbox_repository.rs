//! PostgreSQL implementation of the access outbox.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AccessOutbox, OutboxEntry};

use super::rows::OutboxRow;

/// PostgreSQL access outbox.
pub struct PgAccessOutbox {
    pool: PgPool,
}

impl PgAccessOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessOutbox for PgAccessOutbox {
    async fn enqueue(&self, entry: &OutboxEntry) -> Result<(), DomainError> {
        let payload = serde_json::to_value(&entry.task).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Failed to serialize access task: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO access_outbox (
                id, task, status, attempts, last_error, created_at, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(payload)
        .bind(entry.status.as_str())
        .bind(entry.attempts as i32)
        .bind(&entry.last_error)
        .bind(entry.created_at.as_datetime())
        .bind(entry.processed_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to enqueue outbox entry: {}", e)))?;

        Ok(())
    }

    async fn pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, task, status, attempts, last_error, created_at, processed_at
            FROM access_outbox
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to read pending outbox: {}", e)))?;

        rows.into_iter().map(OutboxEntry::try_from).collect()
    }

    async fn update(&self, entry: &OutboxEntry) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE access_outbox SET
                status = $2,
                attempts = $3,
                last_error = $4,
                processed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(entry.id)
        .bind(entry.status.as_str())
        .bind(entry.attempts as i32)
        .bind(&entry.last_error)
        .bind(entry.processed_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update outbox entry: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!(
                "Outbox entry {} not found",
                entry.id
            )));
        }
        Ok(())
    }
}
