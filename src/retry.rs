use crate::config::Translation;
use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// Bounded retries with exponential backoff around any fallible call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(t: &Translation) -> Self {
        Self::new(t.max_attempts, t.base_delay())
    }

    /// Delay after the failed attempt `attempt` (0-based): base, 2·base, 4·base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Calls `f` until it succeeds or the attempts run out; the last error is
    /// returned. There is no wait after the final attempt.
    pub fn run<T, E: Display>(
        &self,
        backend: &str,
        mut f: impl FnMut(u32) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 0;
        loop {
            match f(attempt) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    warn!(
                        backend,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        "attempt failed: {e}"
                    );
                    if attempt + 1 >= self.max_attempts {
                        return Err(e);
                    }
                    let wait = self.delay_for(attempt);
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
