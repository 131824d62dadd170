//! Periodic sweep configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Cadence settings for the periodic jobs
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Seconds between reconciliation sweeps (default: daily)
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,

    /// Rolling window of transactions the reconciliation sweep examines
    #[serde(default = "default_reconcile_lookback")]
    pub reconcile_lookback_hours: i64,

    /// Seconds between expiration sweeps (default: hourly)
    #[serde(default = "default_expire_interval")]
    pub expire_interval_secs: u64,

    /// Seconds between outbox relay passes
    #[serde(default = "default_relay_interval")]
    pub relay_interval_secs: u64,
}

impl SweepConfig {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn expire_interval(&self) -> Duration {
        Duration::from_secs(self.expire_interval_secs)
    }

    pub fn relay_interval(&self) -> Duration {
        Duration::from_secs(self.relay_interval_secs)
    }

    /// Validate sweep configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reconcile_interval_secs == 0
            || self.expire_interval_secs == 0
            || self.relay_interval_secs == 0
        {
            return Err(ValidationError::InvalidSweepInterval);
        }
        if self.reconcile_lookback_hours <= 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval(),
            reconcile_lookback_hours: default_reconcile_lookback(),
            expire_interval_secs: default_expire_interval(),
            relay_interval_secs: default_relay_interval(),
        }
    }
}

fn default_reconcile_interval() -> u64 {
    86_400
}

fn default_reconcile_lookback() -> i64 {
    24
}

fn default_expire_interval() -> u64 {
    3_600
}

fn default_relay_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_daily_and_hourly() {
        let config = SweepConfig::default();
        assert_eq!(config.reconcile_interval(), Duration::from_secs(86_400));
        assert_eq!(config.expire_interval(), Duration::from_secs(3_600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = SweepConfig {
            expire_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
