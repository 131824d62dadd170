//! PostgreSQL implementation of the plan catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::Plan;
use crate::ports::PlanCatalog;

use super::rows::PlanRow;

/// PostgreSQL plan catalog (read-only).
pub struct PgPlanCatalog {
    pool: PgPool,
}

impl PgPlanCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanCatalog for PgPlanCatalog {
    async fn find(&self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, channel_id, duration_days, price, currency
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find plan: {}", e)))?;

        Ok(row.map(Plan::from))
    }
}
