//! HTTP chat provider adapter.
//!
//! Maps the [`ChatProvider`] port onto the chat platform's bot REST API.
//! Every call carries the bot credential and a bounded timeout; response
//! statuses are classified into [`ChatError`] for the caller's retry policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::ChatConfig;
use crate::domain::foundation::{ChannelId, ChatUserId, Timestamp};
use crate::ports::{ChatError, ChatMember, ChatProvider, InviteLink};

/// Bot API client configuration.
#[derive(Clone)]
pub struct BotApiConfig {
    bot_token: SecretString,
    base_url: String,
    timeout: Duration,
}

impl BotApiConfig {
    pub fn new(bot_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            bot_token: SecretString::new(bot_token.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            bot_token: SecretString::new(config.bot_token.clone()),
            base_url: config.api_base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// HTTP implementation of the [`ChatProvider`] port.
pub struct BotApiChatProvider {
    config: BotApiConfig,
    client: reqwest::Client,
}

impl BotApiChatProvider {
    pub fn new(config: BotApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ChatError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.config.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::classify_error(response).await)
        }
    }

    async fn classify_error(response: reqwest::Response) -> ChatError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(5),
            },
            s if s.is_client_error() => ChatError::Rejected {
                status: s.as_u16(),
                message: body,
            },
            s => ChatError::Transport(format!("chat API returned {}: {}", s, body)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InviteLinkResponse {
    invite_url: String,
    member_limit: u32,
}

#[derive(Debug, Deserialize)]
struct MemberResponse {
    user_id: i64,
    is_member: bool,
}

#[async_trait]
impl ChatProvider for BotApiChatProvider {
    async fn create_invite_link(
        &self,
        channel: ChannelId,
        member_limit: u32,
    ) -> Result<InviteLink, ChatError> {
        let response = self
            .post(
                &format!("/channels/{}/invites", channel),
                serde_json::json!({ "member_limit": member_limit }),
            )
            .await?;

        let body: InviteLinkResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(InviteLink {
            url: body.invite_url,
            member_limit: body.member_limit,
        })
    }

    async fn ban_member(
        &self,
        channel: ChannelId,
        user: ChatUserId,
        until: Timestamp,
    ) -> Result<(), ChatError> {
        self.post(
            &format!("/channels/{}/ban", channel),
            serde_json::json!({
                "user_id": user.as_i64(),
                "until": until.as_unix_secs(),
            }),
        )
        .await?;
        Ok(())
    }

    async fn unban_member(&self, channel: ChannelId, user: ChatUserId) -> Result<(), ChatError> {
        self.post(
            &format!("/channels/{}/unban", channel),
            serde_json::json!({ "user_id": user.as_i64() }),
        )
        .await?;
        Ok(())
    }

    async fn approve_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError> {
        self.post(
            &format!("/channels/{}/join-requests/{}/approve", channel, user),
            serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    async fn decline_join_request(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<(), ChatError> {
        self.post(
            &format!("/channels/{}/join-requests/{}/decline", channel, user),
            serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    async fn get_member(
        &self,
        channel: ChannelId,
        user: ChatUserId,
    ) -> Result<ChatMember, ChatError> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{}/members/{}", channel, user)))
            .bearer_auth(self.config.bot_token.expose_secret())
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }

        let body: MemberResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(ChatMember {
            user_id: ChatUserId::new(body.user_id),
            is_member: body.is_member,
        })
    }

    async fn send_direct_message(&self, user: ChatUserId, text: &str) -> Result<(), ChatError> {
        self.post(
            "/messages",
            serde_json::json!({
                "user_id": user.as_i64(),
                "text": text,
            }),
        )
        .await?;
        Ok(())
    }
}
