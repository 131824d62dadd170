//! PostgreSQL implementation of the subscription repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{ChatUserId, DomainError, Timestamp};
use crate::domain::ledger::Payee;
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

use super::codecs::parse_payee;
use super::rows::SubscriptionRow;

const SELECT_COLUMNS: &str = r#"
    SELECT payee_kind, payee_id, status, plan_id, chat_user_id,
           period_start, period_end, created_at, updated_at
    FROM subscriptions
"#;

/// PostgreSQL subscription repository.
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_pair(row: SubscriptionRow) -> Result<(Payee, Subscription), DomainError> {
    let payee = parse_payee(&row.payee_kind, row.payee_id)?;
    Ok((payee, row.into_subscription()?))
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_payee(&self, payee: &Payee) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE payee_kind = $1 AND payee_id = $2",
            SELECT_COLUMNS
        ))
        .bind(payee.kind.as_str())
        .bind(payee.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find subscription: {}", e)))?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    async fn find_by_chat_user(
        &self,
        chat_user_id: ChatUserId,
    ) -> Result<Option<(Payee, Subscription)>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE chat_user_id = $1", SELECT_COLUMNS))
                .bind(chat_user_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to find subscription: {}", e))
                })?;

        row.map(row_to_pair).transpose()
    }

    async fn upsert(&self, payee: &Payee, subscription: &Subscription) -> Result<(), DomainError> {
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
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert subscription: {}", e)))?;

        Ok(())
    }

    async fn find_expired(
        &self,
        now: Timestamp,
    ) -> Result<Vec<(Payee, Subscription)>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            r#"{}
            WHERE status = 'active' AND period_end < $1
            ORDER BY period_end ASC
            "#,
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to query expired subscriptions: {}", e))
        })?;

        rows.into_iter().map(row_to_pair).collect()
    }
}
