//! Side-effect tasks queued by the settlement path.
//!
//! Channel membership changes are decoupled from the financial transition:
//! the engine (and the moderation path) enqueue a task in the same storage
//! transaction as the state change, and the outbox relay performs it against
//! the chat provider afterwards: retryable without re-running settlement.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, ChatUserId, SubscriberId};

use super::AccessActor;

/// A pending membership side effect.
///
/// Carries the authority that ordered it so the audit entry written at
/// delivery time names the right actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessTask {
    /// Invite the subscriber into the channel.
    Grant {
        subscriber_id: SubscriberId,
        channel_id: ChannelId,
        chat_user_id: ChatUserId,
        performed_by: AccessActor,
    },
    /// Remove the subscriber from the channel.
    Revoke {
        subscriber_id: SubscriberId,
        channel_id: ChannelId,
        chat_user_id: ChatUserId,
        performed_by: AccessActor,
        reason: String,
    },
}

impl AccessTask {
    pub fn subscriber_id(&self) -> SubscriberId {
        match self {
            AccessTask::Grant { subscriber_id, .. } => *subscriber_id,
            AccessTask::Revoke { subscriber_id, .. } => *subscriber_id,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        match self {
            AccessTask::Grant { channel_id, .. } => *channel_id,
            AccessTask::Revoke { channel_id, .. } => *channel_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_kind_tag() {
        let task = AccessTask::Grant {
            subscriber_id: SubscriberId::new(),
            channel_id: ChannelId::new(-100500),
            chat_user_id: ChatUserId::new(42),
            performed_by: AccessActor::System,
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["kind"], "grant");

        let back: AccessTask = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn revoke_task_carries_reason() {
        let task = AccessTask::Revoke {
            subscriber_id: SubscriberId::new(),
            channel_id: ChannelId::new(-1),
            chat_user_id: ChatUserId::new(7),
            performed_by: AccessActor::Admin,
            reason: "expired".to_string(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["kind"], "revoke");
        assert_eq!(json["reason"], "expired");
    }
}
