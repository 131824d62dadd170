//! State machine trait for lifecycle status enums.
//!
//! Both the transaction ledger and the subscription lifecycle move through
//! fixed, forward-only status graphs. Implementing this trait gives a status
//! enum validated transitions with a single enforcement point.

use super::ValidationError;

/// Trait for status enums that represent state machines.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition with validation, returning an error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if the current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal invoice-shaped machine to exercise the trait defaults.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum InvoiceStage {
        Open,
        Paying,
        Settled,
    }

    impl StateMachine for InvoiceStage {
        fn can_transition_to(&self, target: &Self) -> bool {
            use InvoiceStage::*;
            matches!((self, target), (Open, Paying) | (Open, Settled) | (Paying, Settled))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use InvoiceStage::*;
            match self {
                Open => vec![Paying, Settled],
                Paying => vec![Settled],
                Settled => vec![],
            }
        }
    }

    #[test]
    fn valid_transition_succeeds() {
        assert_eq!(
            InvoiceStage::Open.transition_to(InvoiceStage::Paying),
            Ok(InvoiceStage::Paying)
        );
    }

    #[test]
    fn invalid_transition_is_rejected() {
        assert!(InvoiceStage::Settled
            .transition_to(InvoiceStage::Open)
            .is_err());
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(InvoiceStage::Settled.is_terminal());
        assert!(!InvoiceStage::Open.is_terminal());
    }
}
