//! Plan catalog port: read-only plan lookup.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::Plan;

/// Read-only access to the plan catalog.
///
/// Plans are owned by the admin surface (out of scope here); the core only
/// ever reads them.
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// Finds a plan by id.
    async fn find(&self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError>;
}
