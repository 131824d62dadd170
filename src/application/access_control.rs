//! Access control engine: channel membership changes with bounded retry.
//!
//! Grants and revokes are deliberately decoupled from financial state: by
//! the time this engine runs, the settlement (or sweep) that ordered the
//! change has already committed, and nothing here ever rolls it back. A
//! subscriber whose grant fails is still subscribed; the outbox retries the
//! grant until it lands or is abandoned for an operator.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::access::{AccessActor, AccessLogEntry};
use crate::domain::foundation::{ChannelId, ChatUserId, Clock, DomainError, Sleeper, SubscriberId};
use crate::ports::{AccessLogRepository, ChatError, ChatProvider, SubscriptionRepository};

use super::retry::RetryPolicy;

/// Invite links are single-use: one join, then the link is dead.
pub const INVITE_MEMBER_LIMIT: u32 = 1;

/// Ban length used for revocation. Long enough to eject, short enough that
/// the provider treats it as temporary; the explicit unban right after makes
/// the user free to re-subscribe.
pub const EJECT_BAN_SECS: i64 = 60;

/// Errors from access control operations.
#[derive(Debug, Error)]
pub enum AccessControlError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Outcome of a join-request check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDecision {
    Approved,
    Declined,
}

/// Engine performing channel membership changes against the chat provider.
pub struct AccessControlEngine {
    chat: Arc<dyn ChatProvider>,
    access_log: Arc<dyn AccessLogRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
}

impl AccessControlEngine {
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        access_log: Arc<dyn AccessLogRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chat,
            access_log,
            subscriptions,
            policy,
            sleeper,
            clock,
        }
    }

    /// Grants channel access: creates a single-use invite link, delivers it
    /// to the subscriber, and appends the audit entry.
    pub async fn grant(
        &self,
        subscriber_id: SubscriberId,
        channel_id: ChannelId,
        chat_user_id: ChatUserId,
        performed_by: AccessActor,
        reason: &str,
    ) -> Result<(), AccessControlError> {
        let link = self
            .policy
            .run(self.sleeper.as_ref(), "create_invite_link", || {
                self.chat.create_invite_link(channel_id, INVITE_MEMBER_LIMIT)
            })
            .await?;

        let text = format!("Your subscription is active. Join here: {}", link.url);
        self.policy
            .run(self.sleeper.as_ref(), "send_invite", || {
                self.chat.send_direct_message(chat_user_id, &text)
            })
            .await?;

        self.access_log
            .append(&AccessLogEntry::grant(
                subscriber_id,
                channel_id,
                performed_by,
                reason,
                self.clock.now(),
            ))
            .await?;

        tracing::info!(%subscriber_id, %channel_id, "channel access granted");
        Ok(())
    }

    /// Revokes channel access: short time-boxed ban to eject the user,
    /// followed by an explicit unban so they can re-subscribe later, then
    /// the audit entry.
    pub async fn revoke(
        &self,
        subscriber_id: SubscriberId,
        channel_id: ChannelId,
        chat_user_id: ChatUserId,
        performed_by: AccessActor,
        reason: &str,
    ) -> Result<(), AccessControlError> {
        let until = self.clock.now().plus_secs(EJECT_BAN_SECS);
        self.policy
            .run(self.sleeper.as_ref(), "ban_member", || {
                self.chat.ban_member(channel_id, chat_user_id, until)
            })
            .await?;

        self.policy
            .run(self.sleeper.as_ref(), "unban_member", || {
                self.chat.unban_member(channel_id, chat_user_id)
            })
            .await?;

        self.access_log
            .append(&AccessLogEntry::revoke(
                subscriber_id,
                channel_id,
                performed_by,
                reason,
                self.clock.now(),
            ))
            .await?;

        tracing::info!(%subscriber_id, %channel_id, reason, "channel access revoked");
        Ok(())
    }

    /// Gates a pending join request on subscription state: approved only for
    /// a subscriber whose subscription is active right now.
    pub async fn handle_join_request(
        &self,
        channel_id: ChannelId,
        chat_user_id: ChatUserId,
    ) -> Result<JoinDecision, AccessControlError> {
        let now = self.clock.now();
        let active = match self.subscriptions.find_by_chat_user(chat_user_id).await? {
            Some((_, subscription)) => subscription.is_active_at(now),
            None => false,
        };

        if active {
            let member = self
                .policy
                .run(self.sleeper.as_ref(), "get_member", || {
                    self.chat.get_member(channel_id, chat_user_id)
                })
                .await?;
            if member.is_member {
                // Duplicate request from someone already inside.
                return Ok(JoinDecision::Approved);
            }
            self.policy
                .run(self.sleeper.as_ref(), "approve_join_request", || {
                    self.chat.approve_join_request(channel_id, chat_user_id)
                })
                .await?;
            Ok(JoinDecision::Approved)
        } else {
            self.policy
                .run(self.sleeper.as_ref(), "decline_join_request", || {
                    self.chat.decline_join_request(channel_id, chat_user_id)
                })
                .await?;
            tracing::info!(%chat_user_id, %channel_id, "join request declined, no active subscription");
            Ok(JoinDecision::Declined)
        }
    }
}
