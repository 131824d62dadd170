//! Transaction lifecycle status and the processor status vocabulary.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a ledger transaction.
///
/// The machine only moves forward: once a transaction reaches a terminal
/// status it never leaves it. `Confirmed` is the only status that mutates a
/// subscription, and reaching it twice is impossible by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Invoice issued, no settlement activity seen yet.
    Pending,
    /// Processor reports payment in flight (confirming/sending).
    Confirming,
    /// Funds received in full; terminal and idempotent.
    Confirmed,
    /// Settlement failed (including underpayment); terminal.
    Failed,
    /// Invoice lapsed unpaid; terminal.
    Expired,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirming => "confirming",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Expired => "expired",
        }
    }

    /// True for statuses the engine will never move out of.
    pub fn is_terminal(&self) -> bool {
        StateMachine::is_terminal(self)
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        // Repeating a non-terminal status is a persistable no-op: the
        // processor redelivers `waiting`/`confirming` notifications freely.
        matches!(
            (self, target),
            (Pending, Pending)
                | (Pending, Confirming)
                | (Pending, Confirmed)
                | (Pending, Failed)
                | (Pending, Expired)
                | (Confirming, Confirming)
                | (Confirming, Confirmed)
                | (Confirming, Failed)
                | (Confirming, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Pending, Confirming, Confirmed, Failed, Expired],
            Confirming => vec![Confirming, Confirmed, Failed, Expired],
            Confirmed | Failed | Expired => vec![],
        }
    }
}

/// Processor statuses that mean "funds arrived" and route into the
/// settlement branch of the engine.
///
/// `partially_paid` is deliberately included: it reaches the underpayment
/// check and fails there unless the reported amount covers the invoice.
pub const SETTLED_REPORTS: &[&str] = &["finished", "confirmed", "partially_paid"];

/// Mapping from non-settled processor statuses to ledger statuses.
static REPORT_MAP: Lazy<HashMap<&'static str, TransactionStatus>> = Lazy::new(|| {
    HashMap::from([
        ("waiting", TransactionStatus::Pending),
        ("confirming", TransactionStatus::Confirming),
        ("sending", TransactionStatus::Confirming),
        ("expired", TransactionStatus::Expired),
        ("failed", TransactionStatus::Failed),
        ("refunded", TransactionStatus::Failed),
    ])
});

/// True when the processor-reported status belongs to the settled class.
pub fn is_settled_report(reported: &str) -> bool {
    SETTLED_REPORTS.contains(&reported)
}

/// Maps a non-settled processor status onto the ledger vocabulary.
///
/// Unrecognized statuses map to `Pending` so an unknown report never
/// terminates a transaction.
pub fn map_report(reported: &str) -> TransactionStatus {
    REPORT_MAP
        .get(reported)
        .copied()
        .unwrap_or(TransactionStatus::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_is_terminal() {
        assert!(TransactionStatus::Confirmed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Confirming.is_terminal());
    }

    #[test]
    fn statuses_only_move_forward() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(&Confirming));
        assert!(Confirming.can_transition_to(&Confirmed));
        assert!(!Confirmed.can_transition_to(&Pending));
        assert!(!Failed.can_transition_to(&Confirmed));
        assert!(!Expired.can_transition_to(&Confirming));
        // Regressing from Confirming back to Pending is not allowed either.
        assert!(!Confirming.can_transition_to(&Pending));
    }

    #[test]
    fn repeated_nonterminal_reports_are_noops() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(&Pending));
        assert!(Confirming.can_transition_to(&Confirming));
    }

    #[test]
    fn settled_class_matches_processor_vocabulary() {
        assert!(is_settled_report("finished"));
        assert!(is_settled_report("confirmed"));
        assert!(is_settled_report("partially_paid"));
        assert!(!is_settled_report("waiting"));
        assert!(!is_settled_report("sending"));
    }

    #[test]
    fn nonsettled_reports_map_onto_ledger_statuses() {
        assert_eq!(map_report("waiting"), TransactionStatus::Pending);
        assert_eq!(map_report("confirming"), TransactionStatus::Confirming);
        assert_eq!(map_report("sending"), TransactionStatus::Confirming);
        assert_eq!(map_report("expired"), TransactionStatus::Expired);
        assert_eq!(map_report("failed"), TransactionStatus::Failed);
    }

    #[test]
    fn unknown_report_maps_to_pending() {
        assert_eq!(map_report("zombie_status"), TransactionStatus::Pending);
    }
}
