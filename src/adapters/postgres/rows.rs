//! Row structs and their aggregate conversions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::access::AccessLogEntry;
use crate::domain::foundation::{
    ChannelId, ChatUserId, DomainError, ErrorCode, InvoiceId, PlanId, SubscriberId, Timestamp,
    TransactionId,
};
use crate::domain::ledger::Transaction;
use crate::domain::subscription::{Plan, Subscription};
use crate::ports::OutboxEntry;

use super::codecs::{
    parse_access_action, parse_access_actor, parse_outbox_status, parse_subscription_status,
    parse_transaction_status,
};

#[derive(Debug, FromRow)]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub invoice_id: String,
    pub payee_kind: String,
    pub payee_id: Uuid,
    pub plan_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            invoice_id: InvoiceId::new(row.invoice_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid invoice_id: {}", e))
            })?,
            payee: super::codecs::parse_payee(&row.payee_kind, row.payee_id)?,
            plan_id: PlanId::from_uuid(row.plan_id),
            amount: row.amount,
            currency: row.currency,
            status: parse_transaction_status(&row.status)?,
            confirmed_at: row.confirmed_at.map(Timestamp::from_datetime),
            expires_at: Timestamp::from_datetime(row.expires_at),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SubscriptionRow {
    pub payee_kind: String,
    pub payee_id: Uuid,
    pub status: String,
    pub plan_id: Uuid,
    pub chat_user_id: Option<i64>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    pub(crate) fn into_subscription(self) -> Result<Subscription, DomainError> {
        Ok(Subscription {
            status: parse_subscription_status(&self.status)?,
            plan_id: PlanId::from_uuid(self.plan_id),
            chat_user_id: self.chat_user_id.map(ChatUserId::new),
            period_start: Timestamp::from_datetime(self.period_start),
            period_end: Timestamp::from_datetime(self.period_end),
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PlanRow {
    pub id: Uuid,
    pub channel_id: i64,
    pub duration_days: i32,
    pub price: Decimal,
    pub currency: String,
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Plan {
            id: PlanId::from_uuid(row.id),
            channel_id: ChannelId::new(row.channel_id),
            duration_days: row.duration_days.max(0) as u32,
            price: row.price,
            currency: row.currency,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AccessLogRow {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub channel_id: i64,
    pub action: String,
    pub performed_by: String,
    pub reason: String,
    pub performed_at: DateTime<Utc>,
}

impl TryFrom<AccessLogRow> for AccessLogEntry {
    type Error = DomainError;

    fn try_from(row: AccessLogRow) -> Result<Self, Self::Error> {
        Ok(AccessLogEntry {
            id: row.id,
            subject_id: SubscriberId::from_uuid(row.subject_id),
            channel_id: ChannelId::new(row.channel_id),
            action: parse_access_action(&row.action)?,
            performed_by: parse_access_actor(&row.performed_by)?,
            reason: row.reason,
            timestamp: Timestamp::from_datetime(row.performed_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct OutboxRow {
    pub id: Uuid,
    pub task: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OutboxRow> for OutboxEntry {
    type Error = DomainError;

    fn try_from(row: OutboxRow) -> Result<Self, Self::Error> {
        Ok(OutboxEntry {
            id: row.id,
            task: serde_json::from_value(row.task).map_err(|e| {
                DomainError::new(
                    ErrorCode::SerializationError,
                    format!("Invalid outbox task payload: {}", e),
                )
            })?,
            status: parse_outbox_status(&row.status)?,
            attempts: row.attempts.max(0) as u32,
            last_error: row.last_error,
            created_at: Timestamp::from_datetime(row.created_at),
            processed_at: row.processed_at.map(Timestamp::from_datetime),
        })
    }
}
