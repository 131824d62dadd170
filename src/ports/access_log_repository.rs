//! Access log repository port.

use async_trait::async_trait;

use crate::domain::access::AccessLogEntry;
use crate::domain::foundation::{DomainError, SubscriberId};

/// Append-only store for the access audit trail.
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    /// Appends one audit entry. Entries are never updated or deleted.
    async fn append(&self, entry: &AccessLogEntry) -> Result<(), DomainError>;

    /// Lists a subject's entries, newest first.
    async fn list_for_subject(
        &self,
        subject_id: &SubscriberId,
    ) -> Result<Vec<AccessLogEntry>, DomainError>;
}
