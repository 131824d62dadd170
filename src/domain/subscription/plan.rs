//! Subscription plans.
//!
//! A plan is a client's offering for their channel: a duration and a price.
//! Plans are read-only to the settlement core; once a confirmed transaction
//! references one, its terms are fixed for that transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, PlanId};

/// A purchasable access period for a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Channel the plan grants access to.
    pub channel_id: ChannelId,
    /// Access period bought per confirmed payment.
    pub duration_days: u32,
    /// Price per period, in `currency`.
    pub price: Decimal,
    pub currency: String,
}

impl Plan {
    pub fn new(
        id: PlanId,
        channel_id: ChannelId,
        duration_days: u32,
        price: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id,
            channel_id,
            duration_days,
            price,
            currency: currency.into(),
        }
    }
}
