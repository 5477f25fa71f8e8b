use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounded retry with exponential backoff for transient storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Default: 4.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    /// Delay before the first retry, in milliseconds. Default: 50.
    #[serde(default = "default_base_ms")]
    pub base_ms: u64,
    /// Upper bound for any single delay, in milliseconds. Default: 1000.
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

fn default_max_attempts() -> u8 {
    4
}
fn default_base_ms() -> u64 {
    50
}
fn default_max_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_ms: default_base_ms(),
            max_ms: default_max_ms(),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `failed_attempts` failures.
    pub fn should_retry(&self, failed_attempts: u8) -> bool {
        failed_attempts < self.max_attempts
    }

    /// Delay to wait after the given number of failed attempts.
    pub fn delay_for(&self, failed_attempts: u8) -> Duration {
        calculate_backoff(failed_attempts, self.base_ms, self.max_ms)
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}
