//! Notification sink that only logs.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::NotificationSink;

/// Fallback sink used when no operations chat is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, message: &str) -> Result<(), DomainError> {
        tracing::info!(report = message, "sweep report");
        Ok(())
    }
}
