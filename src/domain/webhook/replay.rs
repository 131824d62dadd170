//! Replay guard over the notification's self-reported update time.

use crate::domain::foundation::Timestamp;

use super::WebhookError;

/// Default acceptance window: five minutes.
pub const DEFAULT_WINDOW_SECS: i64 = 300;

/// Rejects notifications whose `updated_at` falls outside the acceptance
/// window.
///
/// A missing timestamp is accepted, and future-dated timestamps are not
/// rejected. Both behaviors track the processor as observed, not a policy
/// choice; the signature over the raw body is the primary defense.
#[derive(Debug, Clone, Copy)]
pub struct ReplayGuard {
    window_secs: i64,
}

impl ReplayGuard {
    pub fn new(window_secs: i64) -> Self {
        Self { window_secs }
    }

    /// Checks the self-reported update time against `now`.
    pub fn check(&self, updated_at: Option<Timestamp>, now: Timestamp) -> Result<(), WebhookError> {
        let Some(updated_at) = updated_at else {
            return Ok(());
        };

        let age_secs = now.duration_since(&updated_at).num_seconds();
        if age_secs > self.window_secs {
            return Err(WebhookError::Stale {
                age_secs,
                window_secs: self.window_secs,
            });
        }

        Ok(())
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn fresh_notification_is_accepted() {
        let guard = ReplayGuard::default();
        // Four minutes old: inside the five-minute window.
        assert!(guard.check(Some(now().minus_secs(240)), now()).is_ok());
    }

    #[test]
    fn stale_notification_is_rejected() {
        let guard = ReplayGuard::default();
        // Six minutes old: outside the window.
        let err = guard.check(Some(now().minus_secs(360)), now()).unwrap_err();
        assert_eq!(
            err,
            WebhookError::Stale {
                age_secs: 360,
                window_secs: 300
            }
        );
    }

    #[test]
    fn exact_window_boundary_is_accepted() {
        let guard = ReplayGuard::default();
        assert!(guard.check(Some(now().minus_secs(300)), now()).is_ok());
        assert!(guard.check(Some(now().minus_secs(301)), now()).is_err());
    }

    #[test]
    fn missing_timestamp_is_accepted() {
        let guard = ReplayGuard::default();
        assert!(guard.check(None, now()).is_ok());
    }

    #[test]
    fn future_timestamp_is_not_rejected() {
        let guard = ReplayGuard::default();
        assert!(guard.check(Some(now().plus_secs(600)), now()).is_ok());
    }

    #[test]
    fn window_is_configurable() {
        let guard = ReplayGuard::new(60);
        assert!(guard.check(Some(now().minus_secs(59)), now()).is_ok());
        assert!(guard.check(Some(now().minus_secs(61)), now()).is_err());
    }
}
