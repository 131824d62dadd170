//! Subscription repository port.

use async_trait::async_trait;

use crate::domain::foundation::{ChatUserId, DomainError, Timestamp};
use crate::domain::ledger::Payee;
use crate::domain::subscription::Subscription;

/// Repository port for subscription facets, keyed by payee.
///
/// Mutation callers are limited by contract to the settlement engine (via
/// the settlement store), the expiration sweep, and the moderation path.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Finds the subscription facet of a payee.
    async fn find_by_payee(&self, payee: &Payee) -> Result<Option<Subscription>, DomainError>;

    /// Finds a subscriber's facet by their chat account.
    ///
    /// Used by the join-request gate, which only knows the chat identity.
    async fn find_by_chat_user(
        &self,
        chat_user_id: ChatUserId,
    ) -> Result<Option<(Payee, Subscription)>, DomainError>;

    /// Creates or replaces the payee's subscription facet.
    async fn upsert(&self, payee: &Payee, subscription: &Subscription) -> Result<(), DomainError>;

    /// Finds active subscriptions whose period ended before `now`.
    ///
    /// This is the expiration sweep's work list.
    async fn find_expired(&self, now: Timestamp)
        -> Result<Vec<(Payee, Subscription)>, DomainError>;
}
