//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is read with the `PAYGATE`
//! prefix and `__` (double underscore) separating nested values.

mod chat;
mod database;
mod error;
mod processor;
mod server;
mod sweeps;

pub use chat::ChatConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use processor::ProcessorConfig;
pub use server::ServerConfig;
pub use sweeps::SweepConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment processor configuration (API key, IPN secret)
    pub processor: ProcessorConfig,

    /// Chat provider configuration (bot token)
    pub chat: ChatConfig,

    /// Periodic sweep cadences
    #[serde(default)]
    pub sweeps: SweepConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYGATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYGATE__DATABASE__URL=...` -> `database.url = ...`
    /// - `PAYGATE__PROCESSOR__IPN_SECRET=...` -> `processor.ipn_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYGATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.processor.validate()?;
        self.chat.validate()?;
        self.sweeps.validate()?;
        Ok(())
    }
}
