//! Retry logic with exponential backoff.
//!
//! One policy type covers every mutating repository operation; each
//! operation kind picks a preset with its own attempt budget and base delay.

use std::fmt::Display;
use std::time::{Duration, Instant};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first (minimum 1).
    pub max_attempts: u32,

    /// Delay after the first failed attempt.
    pub base_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::commit()
    }
}

impl RetryPolicy {
    /// Policy for stage + commit: 3 attempts, 500ms base.
    pub fn commit() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Policy for push: 5 attempts, 2s base.
    pub fn push() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Single attempt, no waiting (fail fast).
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, base_delay: Duration::ZERO, max_delay: Duration::ZERO }
    }

    /// Keep the attempt budget but never sleep. Useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts, base_delay: Duration::ZERO, max_delay: Duration::ZERO }
    }

    /// Delay to wait after failed attempt `attempt` (0-based):
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The final result (success or last error).
    pub result: Result<T, E>,

    /// Number of attempts made.
    pub attempts: u32,

    /// Total time spent (including delays).
    pub total_time: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether more than one attempt was needed.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Get the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// `label` names the operation in the retry log lines. The error of the last
/// attempt is returned unchanged.
pub fn retry<T, E, F>(policy: &RetryPolicy, label: &str, mut operation: F) -> RetryResult<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let start = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        let result = operation();
        attempts += 1;

        match result {
            Err(ref err) if attempts < max_attempts => {
                let delay = policy.delay_for_attempt(attempts - 1);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    label,
                    attempts,
                    max_attempts,
                    err,
                    delay
                );
                std::thread::sleep(delay);
            }
            result => {
                return RetryResult { result, attempts, total_time: start.elapsed() };
            }
        }
    }
}
