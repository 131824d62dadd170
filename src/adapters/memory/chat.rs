//! Scripted in-memory chat provider.
//!
//! Records every call and lets tests script failures (rate limits, outages)
//! for the next N calls. Tracks ban state so revoke-then-grant behavior is
//! observable.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, ChatUserId, Timestamp};
use crate::ports::{ChatError, ChatMember, ChatProvider, InviteLink};

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    CreateInviteLink { channel: ChannelId, member_limit: u32 },
    BanMember { channel: ChannelId, user: ChatUserId, until_unix: i64 },
    UnbanMember { channel: ChannelId, user: ChatUserId },
    ApproveJoinRequest { channel: ChannelId, user: ChatUserId },
    DeclineJoinRequest { channel: ChannelId, user: ChatUserId },
    GetMember { channel: ChannelId, user: ChatUserId },
    SendDirectMessage { user: ChatUserId, text: String },
}

/// In-memory [`ChatProvider`] with scripted failures.
#[derive(Default)]
pub struct FakeChatProvider {
    calls: Mutex<Vec<ChatCall>>,
    script: Mutex<VecDeque<ChatError>>,
    banned: Mutex<HashSet<(i64, i64)>>,
    members: Mutex<HashSet<(i64, i64)>>,
}

impl FakeChatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues errors to be returned by the next fallible calls, in order.
    /// Once the queue drains, calls succeed again.
    pub fn fail_next_with(&self, errors: impl IntoIterator<Item = ChatError>) {
        self.script.lock().unwrap().extend(errors);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    /// True while the user is banned from the channel.
    pub fn is_banned(&self, channel: ChannelId, user: ChatUserId) -> bool {
        self.banned
            .lock()
            .unwrap()
            .contains(&(channel.as_i64(), user.as_i64()))
    }

    fn next_scripted_error(&self) -> Option<ChatError> {
        self.script.lock().unwrap().pop_front()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatProvider for FakeChatProvider {
    async fn create_invite_link(
        &self,
        channel: ChannelId,
        member_limit: u32,
    ) -> Result<InviteLink, ChatError> {
        self.record(ChatCall::CreateInviteLink { channel, member_limit });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        Ok(InviteLink {
            url: format!("https://chat.example/+{}", channel.as_i64().unsigned_abs()),
            member_limit,
        })
    }

    async fn ban_member(
        &self,
        channel: ChannelId,
        user: ChatUserId,
        until: Timestamp,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::BanMember {
            channel,
            user,
            until_unix: until.as_unix_secs(),
        });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        let key = (channel.as_i64(), user.as_i64());
        self.banned.lock().unwrap().insert(key);
        self.members.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn unban_member(&self, channel: ChannelId, user: ChatUserId) -> Result<(), ChatError> {
        self.record(ChatCall::UnbanMember { channel, user });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        self.banned
            .lock()
            .unwrap()
            .remove(&(channel.as_i64(), user.as_i64()));
        Ok(())
    }

    async fn approve_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::ApproveJoinRequest { channel, user });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        self.members
            .lock()
            .unwrap()
            .insert((channel.as_i64(), user.as_i64()));
        Ok(())
    }

    async fn decline_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::DeclineJoinRequest { channel, user });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        Ok(())
    }

    async fn get_member(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<ChatMember, ChatError> {
        self.record(ChatCall::GetMember { channel, user });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        Ok(ChatMember {
            user_id: user,
            is_member: self
                .members
                .lock()
                .unwrap()
                .contains(&(channel.as_i64(), user.as_i64())),
        })
    }

    async fn send_direct_message(&self, user: ChatUserId, text: &str) -> Result<(), ChatError> {
        self.record(ChatCall::SendDirectMessage {
            user,
            text: text.to_string(),
        });
        if let Some(err) = self.next_scripted_error() {
            return Err(err);
        }
        Ok(())
    }
}
