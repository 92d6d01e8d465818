//! Retry policy for failed transfers.
//!
//! A transfer is repeated on the same handle, with no delay, as long as it
//! keeps timing out and the request's retry budget is not spent.

use crate::base::neterror::TransferCode;

/// Reasons a failed attempt may be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The transfer hit its connect or total timeout.
    TimedOut,
}

impl RetryReason {
    /// Map a transfer result to a retry reason, if the failure is retryable.
    pub fn from_code(code: TransferCode) -> Option<Self> {
        if code.is_timeout() {
            Some(Self::TimedOut)
        } else {
            None
        }
    }
}

/// What happens to response headers collected by an attempt that is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderRetention {
    /// Keep them; later attempts append.
    #[default]
    Accumulate,
    /// Drop them before the next attempt starts.
    ResetPerAttempt,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, first one included.
    pub max_attempts: u32,
    pub header_retention: HeaderRetention,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            header_retention: HeaderRetention::default(),
        }
    }

    /// `retries` extra attempts after the first.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::no_retry()
        }
    }

    pub fn header_retention(mut self, retention: HeaderRetention) -> Self {
        self.header_retention = retention;
        self
    }

    /// Whether attempt number `attempt` (1-based) that ended with `code`
    /// should be followed by another.
    pub fn should_retry(&self, attempt: u32, code: TransferCode) -> bool {
        attempt < self.max_attempts && RetryReason::from_code(code).is_some()
    }
}
