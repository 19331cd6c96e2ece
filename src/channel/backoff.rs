use std::time::Duration;

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RECONNECTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Why the channel stopped reconnecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUpReason {
    AttemptsExhausted,
    AuthRejected,
}

/// Outcome of consulting the policy after a failed or dropped connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp(GiveUpReason),
}

/// Attempt-bounded exponential backoff
///
/// `delay(k) = min(base * 2^k, max)` where `k` is the number of retries
/// already scheduled since the last successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    max_reconnects: u32,
    base_delay: Duration,
    max_delay: Duration,
    retry_on_auth_failure: bool,
}

impl ReconnectPolicy {
    pub fn new(max_reconnects: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_reconnects,
            base_delay,
            max_delay,
            retry_on_auth_failure: true,
        }
    }

    /// When false, a credential rejection stops the channel immediately
    pub fn with_retry_on_auth_failure(mut self, retry: bool) -> Self {
        self.retry_on_auth_failure = retry;
        self
    }

    pub fn max_reconnects(&self) -> u32 {
        self.max_reconnects
    }

    pub fn retry_on_auth_failure(&self) -> bool {
        self.retry_on_auth_failure
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    pub fn decide(&self, attempts: u32, auth_failure: bool) -> RetryDecision {
        if auth_failure && !self.retry_on_auth_failure {
            return RetryDecision::GiveUp(GiveUpReason::AuthRejected);
        }
        if attempts >= self.max_reconnects {
            return RetryDecision::GiveUp(GiveUpReason::AttemptsExhausted);
        }
        RetryDecision::RetryAfter(self.delay_for(attempts))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECONNECTS, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}
