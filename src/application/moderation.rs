//! Moderation path: operator-initiated subscription revocation.
//!
//! Sets the subscription to `Revoked` and queues the channel ejection
//! through the outbox, so a chat outage delays the ejection but never the
//! state change.

use std::sync::Arc;

use crate::domain::access::{AccessActor, AccessTask};
use crate::domain::foundation::{Clock, DomainError, ErrorCode, SubscriberId};
use crate::domain::ledger::Payee;
use crate::ports::{AccessOutbox, OutboxEntry, PlanCatalog, SubscriptionRepository};

/// Operator-facing subscription removal.
pub struct ModerationService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanCatalog>,
    outbox: Arc<dyn AccessOutbox>,
    clock: Arc<dyn Clock>,
}

impl ModerationService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanCatalog>,
        outbox: Arc<dyn AccessOutbox>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            outbox,
            clock,
        }
    }

    /// Revokes a payee's subscription and, for subscribers, queues the
    /// channel ejection.
    pub async fn revoke_subscription(
        &self,
        payee: Payee,
        performed_by: AccessActor,
        reason: &str,
    ) -> Result<(), DomainError> {
        let now = self.clock.now();

        let mut subscription =
            self.subscriptions
                .find_by_payee(&payee)
                .await?
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::SubscriptionNotFound,
                        format!("no subscription for payee {}", payee.id),
                    )
                })?;

        subscription.revoke(now)?;
        self.subscriptions.upsert(&payee, &subscription).await?;
        tracing::info!(payee_id = %payee.id, reason, "subscription revoked");

        if payee.is_subscriber() {
            if let Some(chat_user_id) = subscription.chat_user_id {
                let channel_id = self
                    .plans
                    .find(&subscription.plan_id)
                    .await?
                    .map(|plan| plan.channel_id);
                match channel_id {
                    Some(channel_id) => {
                        let task = AccessTask::Revoke {
                            subscriber_id: SubscriberId::from_uuid(payee.id),
                            channel_id,
                            chat_user_id,
                            performed_by,
                            reason: reason.to_string(),
                        };
                        self.outbox.enqueue(&OutboxEntry::new(task, now)).await?;
                    }
                    None => {
                        tracing::warn!(
                            plan_id = %subscription.plan_id,
                            "plan missing, revoked subscription without ejection task"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
