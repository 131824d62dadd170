//! Outbox relay: delivers queued membership side effects.
//!
//! Runs after every confirmed settlement and on its own cadence, so a task
//! that fails while the chat provider is down is picked up again later
//! without any new financial activity.

use std::sync::Arc;

use crate::domain::access::AccessTask;
use crate::domain::foundation::Clock;
use crate::ports::AccessOutbox;

use super::access_control::{AccessControlEngine, AccessControlError};

/// Entries processed per drain call.
pub const DELIVERY_BATCH: u32 = 20;

/// Delivery attempts per entry before it is abandoned for an operator.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// Aggregate result of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: u32,
    pub failed: u32,
}

/// Drains pending access tasks through the access control engine.
pub struct OutboxRelay {
    outbox: Arc<dyn AccessOutbox>,
    access: Arc<AccessControlEngine>,
    clock: Arc<dyn Clock>,
}

impl OutboxRelay {
    pub fn new(
        outbox: Arc<dyn AccessOutbox>,
        access: Arc<AccessControlEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            outbox,
            access,
            clock,
        }
    }

    /// Processes one batch of pending entries. Per-entry failures are
    /// recorded on the entry and never stop the batch.
    pub async fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();

        let entries = match self.outbox.pending(DELIVERY_BATCH).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(error = %err, "failed to read pending outbox entries");
                return report;
            }
        };

        for mut entry in entries {
            let outcome = self.deliver(&entry.task).await;
            let now = self.clock.now();
            match outcome {
                Ok(()) => {
                    entry.mark_done(now);
                    report.delivered += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        entry_id = %entry.id,
                        attempts = entry.attempts + 1,
                        error = %err,
                        "outbox delivery failed"
                    );
                    entry.mark_failed(err.to_string(), MAX_DELIVERY_ATTEMPTS, now);
                    report.failed += 1;
                }
            }
            if let Err(err) = self.outbox.update(&entry).await {
                tracing::error!(entry_id = %entry.id, error = %err, "failed to persist outbox entry");
            }
        }

        report
    }

    async fn deliver(&self, task: &AccessTask) -> Result<(), AccessControlError> {
        match task {
            AccessTask::Grant {
                subscriber_id,
                channel_id,
                chat_user_id,
                performed_by,
            } => {
                self.access
                    .grant(
                        *subscriber_id,
                        *channel_id,
                        *chat_user_id,
                        *performed_by,
                        "payment confirmed",
                    )
                    .await
            }
            AccessTask::Revoke {
                subscriber_id,
                channel_id,
                chat_user_id,
                performed_by,
                reason,
            } => {
                self.access
                    .revoke(
                        *subscriber_id,
                        *channel_id,
                        *chat_user_id,
                        *performed_by,
                        reason,
                    )
                    .await
            }
        }
    }
}
