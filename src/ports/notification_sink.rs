//! Notification sink port: best-effort operator reporting.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Best-effort human-facing reporting channel for sweep outcomes.
///
/// Callers must treat failures as log-and-continue; nothing in the core ever
/// depends on a notification arriving.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers a short operator-facing message.
    async fn notify(&self, message: &str) -> Result<(), DomainError>;
}
