//! Notification sink delivering sweep reports to an operations chat.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{ChatUserId, DomainError, ErrorCode};
use crate::ports::{ChatProvider, NotificationSink};

/// Sink that sends reports to an operations chat via the chat provider.
pub struct ChatNotificationSink {
    chat: Arc<dyn ChatProvider>,
    ops_target: ChatUserId,
}

impl ChatNotificationSink {
    pub fn new(chat: Arc<dyn ChatProvider>, ops_target: ChatUserId) -> Self {
        Self { chat, ops_target }
    }
}

#[async_trait]
impl NotificationSink for ChatNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), DomainError> {
        self.chat
            .send_direct_message(self.ops_target, message)
            .await
            .map_err(|e| DomainError::new(ErrorCode::ChatProviderError, e.to_string()))
    }
}
