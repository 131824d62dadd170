//! Shared domain kernel: errors, identifiers, time, and state machinery.

mod clock;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use clock::{Clock, FixedClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AdminId, ChannelId, ChatUserId, ClientId, InvoiceId, PlanId, SubscriberId, TransactionId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
