use std::time::Duration;

/// How many times a request is retried, how long each try may take and how
/// long to wait between tries.
///
/// Built once by the caller and shared by every request a fetcher makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry; doubles after each one.
    pub backoff: Duration,
    /// Limit on a single attempt, body included. A timed-out attempt is retried.
    pub timeout: Duration,
}

/// Per-attempt limit used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_millis(300),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self {
            retries,
            backoff,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts including the first.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff.saturating_mul(factor)
    }

    /// Statuses worth retrying: timeouts, rate limits and gateway errors.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 413 | 429 | 500 | 502 | 503 | 504)
    }
}
