//! Shared state for the HTTP layer.

use std::sync::Arc;

use crate::application::WebhookIngest;

/// State injected into every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<WebhookIngest>,
}

impl AppState {
    pub fn new(ingest: Arc<WebhookIngest>) -> Self {
        Self { ingest }
    }
}
