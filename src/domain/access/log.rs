//! Access audit trail.
//!
//! One entry per access side effect, append-only. The trail is the record of
//! every membership change the system performed and on whose authority.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ChannelId, SubscriberId, Timestamp};

/// Membership side effect that was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Grant,
    Revoke,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Grant => "grant",
            AccessAction::Revoke => "revoke",
        }
    }
}

/// Authority the side effect was performed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessActor {
    /// Settlement engine or a sweep.
    System,
    /// Platform operator.
    Admin,
    /// Channel-owning client.
    Client,
}

impl AccessActor {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessActor::System => "system",
            AccessActor::Admin => "admin",
            AccessActor::Client => "client",
        }
    }
}

/// Append-only audit record of a single grant or revoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub id: Uuid,
    pub subject_id: SubscriberId,
    pub channel_id: ChannelId,
    pub action: AccessAction,
    pub performed_by: AccessActor,
    pub reason: String,
    pub timestamp: Timestamp,
}

impl AccessLogEntry {
    pub fn grant(
        subject_id: SubscriberId,
        channel_id: ChannelId,
        performed_by: AccessActor,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            channel_id,
            action: AccessAction::Grant,
            performed_by,
            reason: reason.into(),
            timestamp: now,
        }
    }

    pub fn revoke(
        subject_id: SubscriberId,
        channel_id: ChannelId,
        performed_by: AccessActor,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            channel_id,
            action: AccessAction::Revoke,
            performed_by,
            reason: reason.into(),
            timestamp: now,
        }
    }
}
