/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempts per call, including the first one.
    pub max_attempts: usize,
    /// Delay before the first retry in milliseconds.
    pub retry_backoff_ms: u64,
    /// Factor applied to the delay after every retried attempt.
    pub backoff_multiplier: u32,
}

impl ClientOptions {
    /// Returns the delay to wait after the failed attempt with index `attempt` (0-based).
    pub fn backoff_for(&self, attempt: usize) -> u64 {
        let exp = attempt.min(16) as u32;
        let factor = u64::from(self.backoff_multiplier).saturating_pow(exp);
        self.retry_backoff_ms.saturating_mul(factor)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_backoff_ms: 500,
            backoff_multiplier: 2,
        }
    }
}
