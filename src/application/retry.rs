//! Shared retry policy for provider calls.
//!
//! The policy is a plain value injected into callers, with the sleeper
//! injected separately, so backoff behavior is unit-testable without real
//! delays. Rate-limit responses sleep for the provider-specified delay plus
//! a buffer and do NOT consume the attempt budget; transient failures
//! consume an attempt with exponential backoff; everything else propagates
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::domain::foundation::Sleeper;
use crate::ports::{ChatError, ProcessorError};

/// How a failed call should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; propagate to the caller.
    Fatal,
    /// Retry after exponential backoff, consuming an attempt.
    Backoff,
    /// Provider asked for a specific delay; retry after it without
    /// consuming an attempt.
    RateLimited { retry_after: Duration },
}

/// Classification hook the policy uses to interpret errors.
pub trait Retryable {
    fn retry_decision(&self) -> RetryDecision;
}

impl Retryable for ChatError {
    fn retry_decision(&self) -> RetryDecision {
        match self {
            ChatError::RateLimited { retry_after_secs } => RetryDecision::RateLimited {
                retry_after: Duration::from_secs(*retry_after_secs),
            },
            ChatError::Rejected { .. } => RetryDecision::Fatal,
            ChatError::Transport(_) => RetryDecision::Backoff,
        }
    }
}

impl Retryable for ProcessorError {
    fn retry_decision(&self) -> RetryDecision {
        match self {
            ProcessorError::RateLimited { retry_after_secs } => RetryDecision::RateLimited {
                retry_after: Duration::from_secs(*retry_after_secs),
            },
            ProcessorError::Transport(_) | ProcessorError::Unavailable { .. } => {
                RetryDecision::Backoff
            }
            ProcessorError::NotFound(_)
            | ProcessorError::Rejected { .. }
            | ProcessorError::Malformed(_) => RetryDecision::Fatal,
        }
    }
}

/// Retry policy value: attempt budget and backoff curve.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts consumed by transient failures before giving up.
    pub max_attempts: u32,
    /// First backoff delay; doubles per consumed attempt.
    pub base_delay: Duration,
    /// Added on top of provider-specified rate-limit delays.
    pub rate_limit_buffer: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            rate_limit_buffer: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the `attempt`-th consumed failure (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Runs `operation` under this policy, creating a fresh future per try.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        op_name: &str,
        operation: F,
    ) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => match err.retry_decision() {
                    RetryDecision::Fatal => {
                        tracing::warn!(op = op_name, error = %err, "provider call failed, not retryable");
                        return Err(err);
                    }
                    RetryDecision::RateLimited { retry_after } => {
                        let delay = retry_after + self.rate_limit_buffer;
                        tracing::info!(
                            op = op_name,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited, sleeping without consuming an attempt"
                        );
                        sleeper.sleep(delay).await;
                    }
                    RetryDecision::Backoff => {
                        if attempt >= self.max_attempts {
                            tracing::warn!(
                                op = op_name,
                                attempts = attempt,
                                error = %err,
                                "attempt budget exhausted"
                            );
                            return Err(err);
                        }
                        let delay = self.backoff_delay(attempt);
                        tracing::info!(
                            op = op_name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "transient failure, backing off"
                        );
                        sleeper.sleep(delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }
}
