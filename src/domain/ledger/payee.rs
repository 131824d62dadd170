//! Payee identity for ledger transactions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ClientId, SubscriberId};

/// Who a payment credits: the platform itself (a client paying for their
/// channel's standing) or a subscriber paying for channel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayeeKind {
    Platform,
    Subscriber,
}

impl PayeeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayeeKind::Platform => "platform",
            PayeeKind::Subscriber => "subscriber",
        }
    }
}

/// The account a confirmed transaction extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payee {
    pub kind: PayeeKind,
    pub id: Uuid,
}

impl Payee {
    /// Payee for a subscriber paying for channel access.
    pub fn subscriber(id: SubscriberId) -> Self {
        Self {
            kind: PayeeKind::Subscriber,
            id: *id.as_uuid(),
        }
    }

    /// Payee for a client paying the platform.
    pub fn client(id: ClientId) -> Self {
        Self {
            kind: PayeeKind::Platform,
            id: *id.as_uuid(),
        }
    }

    pub fn is_subscriber(&self) -> bool {
        self.kind == PayeeKind::Subscriber
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_payee_carries_kind() {
        let payee = Payee::subscriber(SubscriberId::new());
        assert!(payee.is_subscriber());
        assert_eq!(payee.kind.as_str(), "subscriber");
    }

    #[test]
    fn client_payee_is_platform_kind() {
        let payee = Payee::client(ClientId::new());
        assert!(!payee.is_subscriber());
        assert_eq!(payee.kind.as_str(), "platform");
    }
}
