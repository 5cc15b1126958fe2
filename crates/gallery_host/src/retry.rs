//! Retry policy for transient listing failures.

use std::time::Duration;

use crate::error::GalleryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded linear-backoff retry policy.
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * base_backoff_ms` before the next try.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Returns the delay to wait before retrying after `attempt` (1-based) failed with `err`, or
    /// `None` when no retry should happen.
    pub fn next_delay(&self, attempt: u32, err: &GalleryError) -> Option<Duration> {
        if !err.is_retryable() || attempt >= self.max_attempts {
            return None;
        }
        Some(Duration::from_millis(
            self.base_backoff_ms.saturating_mul(u64::from(attempt)),
        ))
    }
}
