//! # Retry Limit
//!
//! Decides when a repeatedly failing mutation is evicted from the queue.
//! Without a limit, failed items stay queued until they succeed or are
//! resolved by hand. There is no backoff: items are retried on every drain
//! pass.

/// Retry limit for failed pushes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Keep failed items forever
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    /// Evict an item once it has failed `max_attempts` times
    pub fn limited(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn from_max_retries(max_retries: Option<u32>) -> Self {
        match max_retries {
            Some(n) => Self::limited(n),
            None => Self::unbounded(),
        }
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Whether an item with `attempts` failures should be dropped
    pub fn should_evict(&self, attempts: u32) -> bool {
        matches!(self.max_attempts, Some(max) if attempts >= max)
    }
}
