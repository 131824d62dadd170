//! Access outbox port: transactional side-effect queue.
//!
//! A confirmed settlement must grant channel access, but chat-provider
//! availability must never decide whether money settles. The engine enqueues
//! the task in the same storage transaction as the financial transition
//! (through [`SettlementTxn`](super::SettlementTxn)); the relay drains the
//! queue independently and retries without touching the ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use async_trait::async_trait;

use crate::domain::access::AccessTask;
use crate::domain::foundation::{DomainError, Timestamp};

/// Delivery state of an outbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Waiting for the relay (or waiting to be retried).
    Pending,
    /// Side effect performed.
    Done,
    /// Attempt budget exhausted; needs operator attention.
    Abandoned,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Done => "done",
            OutboxStatus::Abandoned => "abandoned",
        }
    }
}

/// A queued membership side effect with delivery bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub task: AccessTask,
    pub status: OutboxStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

impl OutboxEntry {
    /// Creates a fresh pending entry.
    pub fn new(task: AccessTask, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            processed_at: None,
        }
    }

    /// Marks the entry delivered.
    pub fn mark_done(&mut self, now: Timestamp) {
        self.status = OutboxStatus::Done;
        self.attempts += 1;
        self.processed_at = Some(now);
    }

    /// Records a failed attempt. The entry stays pending until the attempt
    /// budget runs out, then is abandoned.
    pub fn mark_failed(&mut self, error: impl Into<String>, max_attempts: u32, now: Timestamp) {
        self.attempts += 1;
        self.last_error = Some(error.into());
        self.processed_at = Some(now);
        if self.attempts >= max_attempts {
            self.status = OutboxStatus::Abandoned;
        }
    }
}

/// Port for the access outbox queue.
#[async_trait]
pub trait AccessOutbox: Send + Sync {
    /// Enqueues a task outside a settlement transaction (moderation path).
    async fn enqueue(&self, entry: &OutboxEntry) -> Result<(), DomainError>;

    /// Returns pending entries, oldest first, up to `limit`.
    async fn pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError>;

    /// Persists updated delivery bookkeeping for an entry.
    async fn update(&self, entry: &OutboxEntry) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::AccessActor;
    use crate::domain::foundation::{ChannelId, ChatUserId, SubscriberId};

    fn grant_task() -> AccessTask {
        AccessTask::Grant {
            subscriber_id: SubscriberId::new(),
            channel_id: ChannelId::new(-1),
            chat_user_id: ChatUserId::new(42),
            performed_by: AccessActor::System,
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn new_entry_is_pending_with_no_attempts() {
        let entry = OutboxEntry::new(grant_task(), now());
        assert_eq!(entry.status, OutboxStatus::Pending);
        assert_eq!(entry.attempts, 0);
        assert!(entry.processed_at.is_none());
    }

    #[test]
    fn mark_done_finishes_entry() {
        let mut entry = OutboxEntry::new(grant_task(), now());
        entry.mark_done(now().plus_secs(5));

        assert_eq!(entry.status, OutboxStatus::Done);
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.processed_at, Some(now().plus_secs(5)));
    }

    #[test]
    fn failures_stay_pending_until_budget_exhausted() {
        let mut entry = OutboxEntry::new(grant_task(), now());

        entry.mark_failed("chat api down", 3, now());
        assert_eq!(entry.status, OutboxStatus::Pending);
        entry.mark_failed("chat api down", 3, now());
        assert_eq!(entry.status, OutboxStatus::Pending);
        entry.mark_failed("chat api down", 3, now());
        assert_eq!(entry.status, OutboxStatus::Abandoned);
        assert_eq!(entry.attempts, 3);
        assert_eq!(entry.last_error.as_deref(), Some("chat api down"));
    }
}
