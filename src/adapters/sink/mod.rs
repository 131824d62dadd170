//! Notification sink adapters.

mod chat_sink;
mod log_sink;

pub use chat_sink::ChatNotificationSink;
pub use log_sink::TracingSink;
