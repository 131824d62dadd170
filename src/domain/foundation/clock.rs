//! Injectable time and sleep sources.
//!
//! The settlement engine, the replay guard, and both sweeps all make
//! decisions against "now", and the retry policy sleeps between attempts.
//! Injecting both keeps every one of those paths deterministic in tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current moment.
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Test clock that returns a fixed, manually advanced instant.
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    /// Creates a clock pinned to the given instant.
    pub fn at(now: Timestamp) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Moves the clock forward by the given number of seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now = now.plus_secs(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

/// Async sleep source used by the retry policy.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test sleeper that records requested durations instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every duration that was requested, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    /// Returns the total time that would have been slept.
    pub fn total(&self) -> Duration {
        self.slept.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_stays_pinned_until_advanced() {
        let clock = FixedClock::at(Timestamp::from_unix_secs(1_700_000_000));

        assert_eq!(clock.now().as_unix_secs(), 1_700_000_000);
        clock.advance_secs(90);
        assert_eq!(clock.now().as_unix_secs(), 1_700_000_090);
    }

    #[tokio::test]
    async fn recording_sleeper_accumulates_without_waiting() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(2)).await;
        sleeper.sleep(Duration::from_millis(500)).await;

        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(2), Duration::from_millis(500)]
        );
        assert_eq!(sleeper.total(), Duration::from_millis(2500));
    }
}
