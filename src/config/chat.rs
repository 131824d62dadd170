//! Chat provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Chat provider (bot API) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Bot credential used against the chat provider API
    pub bot_token: String,

    /// Chat provider API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP timeout for chat provider calls, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Operations channel that receives sweep reports (optional)
    #[serde(default)]
    pub ops_channel_id: Option<i64>,
}

impl ChatConfig {
    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.is_empty() {
            return Err(ValidationError::MissingRequired("CHAT_BOT_TOKEN"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidChatApiUrl);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
            ops_channel_id: None,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.chat.example".to_string()
}

fn default_timeout() -> u64 {
    10
}
