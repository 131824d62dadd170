//! Chat provider port.
//!
//! Everything the access engine needs from the chat platform, expressed as
//! domain actions. Implementations map these onto the provider's bot API;
//! the retry policy lives with the caller, not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{ChannelId, ChatUserId, Timestamp};

/// Single-use invite link into a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteLink {
    pub url: String,
    /// How many joins the link allows. The access engine always asks for 1.
    pub member_limit: u32,
}

/// Channel membership info for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user_id: ChatUserId,
    pub is_member: bool,
}

/// Port for chat platform integrations.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Creates an invite link limited to `member_limit` joins.
    async fn create_invite_link(
        &self,
        channel: ChannelId,
        member_limit: u32,
    ) -> Result<InviteLink, ChatError>;

    /// Bans a user from a channel until the given instant.
    ///
    /// A short `until` makes the ban an ejection, not a blacklist entry.
    async fn ban_member(
        &self,
        channel: ChannelId,
        user: ChatUserId,
        until: Timestamp,
    ) -> Result<(), ChatError>;

    /// Lifts a user's ban so they may rejoin via a future invite.
    async fn unban_member(&self, channel: ChannelId, user: ChatUserId) -> Result<(), ChatError>;

    /// Approves a pending join request.
    async fn approve_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError>;

    /// Declines a pending join request.
    async fn decline_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError>;

    /// Fetches a user's membership state in a channel.
    async fn get_member(&self, channel: ChannelId, user: ChatUserId)
        -> Result<ChatMember, ChatError>;

    /// Sends a direct message to a user.
    async fn send_direct_message(&self, user: ChatUserId, text: &str) -> Result<(), ChatError>;
}

/// Errors from chat provider calls, classified for the retry policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Provider asked us to back off; retry after the given delay without
    /// consuming an attempt.
    #[error("chat provider rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Client-side rejection (4xx other than rate limit); not retryable.
    #[error("chat provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network failure, timeout, or provider 5xx; retryable with backoff.
    #[error("chat provider transport failure: {0}")]
    Transport(String),
}

impl ChatError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ChatError::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_provider_is_object_safe() {
        fn _accepts_dyn(_p: &dyn ChatProvider) {}
    }

    #[test]
    fn only_rejections_are_fatal() {
        assert!(ChatError::RateLimited { retry_after_secs: 1 }.is_retryable());
        assert!(ChatError::Transport("connection reset".into()).is_retryable());
        assert!(!ChatError::Rejected {
            status: 403,
            message: "bot is not channel admin".into()
        }
        .is_retryable());
    }
}
