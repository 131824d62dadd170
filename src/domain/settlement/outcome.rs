//! Settlement outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::ledger::TransactionStatus;

/// What a confirmed settlement activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementAction {
    /// A subscriber's channel access was activated or extended.
    ActivatedSubscriber,
    /// A client's platform standing was activated or extended.
    ActivatedClient,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    /// The transaction was already confirmed; nothing changed.
    AlreadyConfirmed,
    /// Funds settled; the payee's subscription now runs to `period_end`.
    Confirmed {
        action: SettlementAction,
        period_end: Timestamp,
    },
    /// A non-settlement status was recorded; no subscription mutation.
    Updated { status: TransactionStatus },
}

impl ApplyOutcome {
    /// True when this invocation is the one that settled the transaction.
    pub fn is_confirmation(&self) -> bool {
        matches!(self, ApplyOutcome::Confirmed { .. })
    }
}
