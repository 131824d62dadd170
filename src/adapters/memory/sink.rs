//! Collecting notification sink for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::NotificationSink;

/// Sink that stores every message for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CollectingSink {
    async fn notify(&self, message: &str) -> Result<(), DomainError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
