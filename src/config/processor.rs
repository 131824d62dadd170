//! Payment processor configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment processor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    /// Processor API key
    pub api_key: String,

    /// Shared secret the processor signs webhook bodies with
    pub ipn_secret: String,

    /// Processor API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for processor calls, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Replay acceptance window for webhook timestamps, in seconds
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: i64,
}

impl ProcessorConfig {
    /// Validate processor configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PROCESSOR_API_KEY"));
        }
        if self.ipn_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PROCESSOR_IPN_SECRET"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidProcessorUrl);
        }
        if self.replay_window_secs <= 0 {
            return Err(ValidationError::InvalidReplayWindow);
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ipn_secret: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            replay_window_secs: default_replay_window(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.processor.example".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_replay_window() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProcessorConfig {
        ProcessorConfig {
            api_key: "pk_1234".to_string(),
            ipn_secret: "ipn_secret_abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = ProcessorConfig {
            api_key: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_ipn_secret_is_rejected() {
        let config = ProcessorConfig {
            ipn_secret: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nonpositive_replay_window_is_rejected() {
        let config = ProcessorConfig {
            replay_window_secs: 0,
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
