//! Bounded retry with cancellation
//!
//! The same loop drives both retry layers: the client retries every HTTP
//! exchange with a short exponential backoff, and [`crate::Device::action`]
//! retries whole keypress calls with a longer linear backoff on top of that.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{EcpError, Result};

/// Wait between attempts, indexed from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * factor^attempt`
    Exponential { base: Duration, factor: u32 },
    /// `step * (attempt + 1)`
    Linear { step: Duration },
}

impl Backoff {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Exponential { base, factor } => {
                base.saturating_mul(factor.saturating_pow(attempt))
            }
            Backoff::Linear { step } => step.saturating_mul(attempt.saturating_add(1)),
        }
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Per-request policy: 3 attempts, waiting 100ms then 200ms.
    pub fn transport() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(100),
                factor: 2,
            },
        }
    }

    /// Per-action policy: 3 attempts, waiting 1s then 2s.
    pub fn action() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear {
                step: Duration::from_secs(1),
            },
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run `operation` until it succeeds, fails with a final error, runs out
    /// of attempts or `cancel` fires.
    ///
    /// The closure receives the zero-based attempt number. Cancellation is
    /// observed before each attempt, while an attempt is in flight and during
    /// the backoff sleep. No sleep follows the last attempt.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if cancel.is_cancelled() {
                return Err(EcpError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EcpError::Cancelled),
                outcome = operation(attempt) => outcome,
            };

            let err = match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Succeeded on attempt {}/{}", attempt + 1, max_attempts);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }

            let is_last = attempt + 1 == max_attempts;
            if is_last {
                warn!("Attempt {}/{} failed: {}", attempt + 1, max_attempts, err);
            } else {
                let delay = self.backoff.delay_for_attempt(attempt);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt + 1,
                    max_attempts,
                    err,
                    delay
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(EcpError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            last_error = Some(err);
        }

        match last_error {
            Some(err) => Err(EcpError::exhausted(max_attempts, err)),
            None => Err(EcpError::Cancelled),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::transport()
    }
}
