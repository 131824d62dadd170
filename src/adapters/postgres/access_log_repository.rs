//! PostgreSQL implementation of the access log repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::access::AccessLogEntry;
use crate::domain::foundation::{DomainError, SubscriberId};
use crate::ports::AccessLogRepository;

use super::rows::AccessLogRow;

/// PostgreSQL access log repository (append-only).
pub struct PgAccessLogRepository {
    pool: PgPool,
}

impl PgAccessLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    async fn append(&self, entry: &AccessLogEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO access_log (
                id, subject_id, channel_id, action, performed_by, reason, performed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.subject_id.as_uuid())
        .bind(entry.channel_id.as_i64())
        .bind(entry.action.as_str())
        .bind(entry.performed_by.as_str())
        .bind(&entry.reason)
        .bind(entry.timestamp.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append access log: {}", e)))?;

        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject_id: &SubscriberId,
    ) -> Result<Vec<AccessLogEntry>, DomainError> {
        let rows: Vec<AccessLogRow> = sqlx::query_as(
            r#"
            SELECT id, subject_id, channel_id, action, performed_by, reason, performed_at
            FROM access_log
            WHERE subject_id = $1
            ORDER BY performed_at DESC
            "#,
        )
        .bind(subject_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list access log: {}", e)))?;

        rows.into_iter().map(AccessLogEntry::try_from).collect()
    }
}
