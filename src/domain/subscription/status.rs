//! Subscription lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Status of a subscription facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created on first interaction; no confirmed payment yet.
    Pending,
    /// Paid through `period_end`.
    Active,
    /// Period lapsed; may reactivate with a new payment.
    Expired,
    /// Removed by an operator; may reactivate with a new payment.
    Revoked,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Revoked => "revoked",
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        // Every status can (re)activate on a confirmed payment, including
        // Active itself (renewal). Expiry only applies to active periods;
        // revocation only to active ones.
        matches!(
            (self, target),
            (Pending, Active)
                | (Active, Active)
                | (Active, Expired)
                | (Active, Revoked)
                | (Expired, Active)
                | (Revoked, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active],
            Active => vec![Active, Expired, Revoked],
            Expired => vec![Active],
            Revoked => vec![Active],
        }
    }
}
