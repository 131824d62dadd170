//! Expiration sweep: moves lapsed subscriptions to `Expired` and revokes
//! channel access.

use std::sync::Arc;

use crate::domain::access::AccessActor;
use crate::domain::foundation::{Clock, SubscriberId};
use crate::ports::{NotificationSink, PlanCatalog, SubscriptionRepository};

use super::access_control::AccessControlEngine;

/// Aggregate result of one expiration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirationReport {
    pub expired: u32,
    pub failed: u32,
}

/// Periodic job expiring subscriptions past their period end.
pub struct ExpirationSweep {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanCatalog>,
    access: Arc<AccessControlEngine>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl ExpirationSweep {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanCatalog>,
        access: Arc<AccessControlEngine>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            access,
            sink,
            clock,
        }
    }

    /// Runs one pass. Per-subscriber failures are logged and counted, never
    /// halt the batch.
    ///
    /// The status flip is persisted before the revoke call, so a chat
    /// outage cannot leave a subscription active past its period; a failed
    /// revoke leaves an expired subscription with lingering membership,
    /// surfaced via the failure count.
    pub async fn run_once(&self) -> ExpirationReport {
        let mut report = ExpirationReport::default();
        let now = self.clock.now();

        let lapsed = match self.subscriptions.find_expired(now).await {
            Ok(lapsed) => lapsed,
            Err(err) => {
                tracing::error!(error = %err, "expiration query failed");
                return report;
            }
        };

        for (payee, mut subscription) in lapsed {
            if let Err(err) = subscription.expire(now) {
                report.failed += 1;
                tracing::warn!(payee_id = %payee.id, error = %err, "could not expire subscription");
                continue;
            }
            if let Err(err) = self.subscriptions.upsert(&payee, &subscription).await {
                report.failed += 1;
                tracing::warn!(payee_id = %payee.id, error = %err, "could not persist expiration");
                continue;
            }
            report.expired += 1;
            tracing::info!(payee_id = %payee.id, "subscription expired");

            if !payee.is_subscriber() {
                continue;
            }
            let Some(chat_user_id) = subscription.chat_user_id else {
                continue;
            };

            let channel_id = match self.plans.find(&subscription.plan_id).await {
                Ok(Some(plan)) => plan.channel_id,
                Ok(None) => {
                    report.failed += 1;
                    tracing::warn!(
                        plan_id = %subscription.plan_id,
                        "plan missing, cannot revoke channel access"
                    );
                    continue;
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(error = %err, "plan lookup failed");
                    continue;
                }
            };

            if let Err(err) = self
                .access
                .revoke(
                    SubscriberId::from_uuid(payee.id),
                    channel_id,
                    chat_user_id,
                    AccessActor::System,
                    "expired",
                )
                .await
            {
                report.failed += 1;
                tracing::warn!(
                    payee_id = %payee.id,
                    error = %err,
                    "revoke failed for expired subscription"
                );
            }
        }

        if report.expired + report.failed > 0 {
            let message = format!(
                "Expiration sweep: {} expired, {} errors",
                report.expired, report.failed
            );
            if let Err(err) = self.sink.notify(&message).await {
                tracing::warn!(error = %err, "failed to report sweep outcome");
            }
        }

        report
    }
}
