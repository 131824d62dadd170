//! Chat provider adapters.

mod bot_api;

pub use bot_api::{BotApiChatProvider, BotApiConfig};
