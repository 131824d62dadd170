//! Subscription aggregate: the time-boxed access facet of a payee.
//!
//! A subscriber's subscription gates channel membership; a client's
//! subscription gates their standing with the platform. Both share the same
//! lifecycle and the same renewal arithmetic.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ChatUserId, DomainError, ErrorCode, PlanId, StateMachine, Timestamp,
};

use super::{Plan, SubscriptionStatus};

/// Time-boxed access owned by a payee.
///
/// # Invariants
///
/// - `period_end` is monotonically non-decreasing under renewal:
///   a confirmed payment extends from `max(now, period_end)`, never from an
///   earlier point, so credit already bought is never lost and never doubled.
/// - Only the settlement engine, the expiration sweep, and the operator path
///   routed through the engine mutate this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub status: SubscriptionStatus,
    pub plan_id: PlanId,
    /// Chat account of the subscriber; `None` for platform-paying clients.
    pub chat_user_id: Option<ChatUserId>,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates the pending facet recorded on first interaction.
    pub fn pending(plan_id: PlanId, chat_user_id: Option<ChatUserId>, now: Timestamp) -> Self {
        Self {
            status: SubscriptionStatus::Pending,
            plan_id,
            chat_user_id,
            period_start: now,
            period_end: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the subscription grants access at `now`.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && self.period_end.is_after(&now)
    }

    /// The instant a confirmed payment extends from: the current period end
    /// while the subscription is live, otherwise `now`.
    pub fn renewal_base(&self, now: Timestamp) -> Timestamp {
        if self.is_active_at(now) {
            self.period_end
        } else {
            now
        }
    }

    /// Applies a confirmed payment: activates the subscription on `plan` and
    /// extends the period. Returns the new period end.
    ///
    /// Renewing a live subscription stacks the new period on top of the
    /// remaining one; a lapsed or fresh subscription restarts at `now`.
    pub fn apply_confirmed_payment(
        &mut self,
        plan: &Plan,
        now: Timestamp,
    ) -> Result<Timestamp, DomainError> {
        let base = self.renewal_base(now);
        let was_live = self.is_active_at(now);

        self.transition_to(SubscriptionStatus::Active)?;
        if !was_live {
            self.period_start = now;
        }
        self.period_end = base.add_days(i64::from(plan.duration_days));
        self.plan_id = plan.id;
        self.updated_at = now;
        Ok(self.period_end)
    }

    /// Marks the subscription expired after its period lapsed.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the subscription revoked by an operator.
    pub fn revoke(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Revoked)?;
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot move subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ChannelId;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn base_time() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn plan_30d() -> Plan {
        Plan::new(
            PlanId::new(),
            ChannelId::new(-100500),
            30,
            Decimal::from_str("25.00").unwrap(),
            "usd",
        )
    }

    #[test]
    fn fresh_activation_runs_from_now() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), Some(ChatUserId::new(42)), now);

        let new_end = sub.apply_confirmed_payment(&plan_30d(), now).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.period_start, now);
        assert_eq!(new_end, now.add_days(30));
    }

    #[test]
    fn renewal_stacks_on_remaining_period() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), Some(ChatUserId::new(42)), now);
        sub.apply_confirmed_payment(&plan_30d(), now).unwrap();

        // Renew ten days in: 20 days remain, the new end must be now+50d.
        let later = now.add_days(10);
        let new_end = sub.apply_confirmed_payment(&plan_30d(), later).unwrap();

        assert_eq!(new_end, now.add_days(60));
        assert_eq!(sub.period_start, now);
    }

    #[test]
    fn renewal_after_lapse_restarts_from_now() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), Some(ChatUserId::new(42)), now);
        sub.apply_confirmed_payment(&plan_30d(), now).unwrap();

        // Period is over; the stale end must not anchor the new period.
        let later = now.add_days(45);
        let new_end = sub.apply_confirmed_payment(&plan_30d(), later).unwrap();

        assert_eq!(new_end, later.add_days(30));
        assert_eq!(sub.period_start, later);
    }

    #[test]
    fn expired_subscription_reactivates_on_payment() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), Some(ChatUserId::new(42)), now);
        sub.apply_confirmed_payment(&plan_30d(), now).unwrap();

        let after_period = now.add_days(31);
        sub.expire(after_period).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Expired);

        let new_end = sub
            .apply_confirmed_payment(&plan_30d(), after_period.add_days(1))
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(new_end, after_period.add_days(31));
    }

    #[test]
    fn pending_subscription_cannot_expire() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), None, now);
        assert!(sub.expire(now).is_err());
    }

    #[test]
    fn active_subscription_within_period_is_active() {
        let now = base_time();
        let mut sub = Subscription::pending(PlanId::new(), Some(ChatUserId::new(7)), now);
        sub.apply_confirmed_payment(&plan_30d(), now).unwrap();

        assert!(sub.is_active_at(now.add_days(29)));
        assert!(!sub.is_active_at(now.add_days(30)));
        assert!(!sub.is_active_at(now.add_days(31)));
    }
}
