//! String codecs shared by the Postgres adapters.
//!
//! Status enums are stored as lowercase text columns; these helpers are the
//! single place the database vocabulary is defined.

use crate::domain::access::{AccessAction, AccessActor};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::ledger::{Payee, PayeeKind, TransactionStatus};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::OutboxStatus;
use uuid::Uuid;

pub(crate) fn parse_transaction_status(s: &str) -> Result<TransactionStatus, DomainError> {
    match s {
        "pending" => Ok(TransactionStatus::Pending),
        "confirming" => Ok(TransactionStatus::Confirming),
        "confirmed" => Ok(TransactionStatus::Confirmed),
        "failed" => Ok(TransactionStatus::Failed),
        "expired" => Ok(TransactionStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid transaction status: {}", s),
        )),
    }
}

pub(crate) fn parse_subscription_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s {
        "pending" => Ok(SubscriptionStatus::Pending),
        "active" => Ok(SubscriptionStatus::Active),
        "expired" => Ok(SubscriptionStatus::Expired),
        "revoked" => Ok(SubscriptionStatus::Revoked),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid subscription status: {}", s),
        )),
    }
}

pub(crate) fn parse_payee(kind: &str, id: Uuid) -> Result<Payee, DomainError> {
    let kind = match kind {
        "platform" => PayeeKind::Platform,
        "subscriber" => PayeeKind::Subscriber,
        _ => {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payee kind: {}", kind),
            ))
        }
    };
    Ok(Payee { kind, id })
}

pub(crate) fn parse_outbox_status(s: &str) -> Result<OutboxStatus, DomainError> {
    match s {
        "pending" => Ok(OutboxStatus::Pending),
        "done" => Ok(OutboxStatus::Done),
        "abandoned" => Ok(OutboxStatus::Abandoned),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid outbox status: {}", s),
        )),
    }
}

pub(crate) fn parse_access_action(s: &str) -> Result<AccessAction, DomainError> {
    match s {
        "grant" => Ok(AccessAction::Grant),
        "revoke" => Ok(AccessAction::Revoke),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid access action: {}", s),
        )),
    }
}

pub(crate) fn parse_access_actor(s: &str) -> Result<AccessActor, DomainError> {
    match s {
        "system" => Ok(AccessActor::System),
        "admin" => Ok(AccessActor::Admin),
        "client" => Ok(AccessActor::Client),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid access actor: {}", s),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_status_roundtrips() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Confirming,
            TransactionStatus::Confirmed,
            TransactionStatus::Failed,
            TransactionStatus::Expired,
        ] {
            assert_eq!(parse_transaction_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn subscription_status_roundtrips() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Revoked,
        ] {
            assert_eq!(parse_subscription_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn payee_kind_roundtrips() {
        let id = Uuid::new_v4();
        assert_eq!(parse_payee("platform", id).unwrap().kind, PayeeKind::Platform);
        assert_eq!(
            parse_payee("subscriber", id).unwrap().kind,
            PayeeKind::Subscriber
        );
        assert!(parse_payee("unknown", id).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_transaction_status("settled").is_err());
        assert!(parse_subscription_status("paused").is_err());
        assert!(parse_outbox_status("queued").is_err());
        assert!(parse_access_action("kick").is_err());
        assert!(parse_access_actor("robot").is_err());
    }
}
