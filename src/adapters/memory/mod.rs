//! In-memory adapters for tests and local development.

mod chat;
mod sink;
mod store;

pub use chat::{ChatCall, FakeChatProvider};
pub use sink::CollectingSink;
pub use store::InMemoryStore;
