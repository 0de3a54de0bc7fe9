//! Fixed-delay retry for flaky operations.
//!
//! Not used for element waits (those poll via [`crate::wait`]); this is for
//! whole actions that may fail transiently, such as a tap racing a re-render.

use crate::result::OnboardResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (at least one is always made)
    pub attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    #[must_use]
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `op` under this policy
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub async fn run<T, F, Fut>(&self, op: F) -> OnboardResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OnboardResult<T>>,
    {
        retry(self.attempts, self.delay, op).await
    }
}

/// Call `op` up to `attempts` times with `delay` between attempts.
///
/// Each failed attempt except the last is logged as a warning. The last
/// error is returned unchanged.
///
/// # Errors
///
/// Returns the error of the final attempt.
pub async fn retry<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> OnboardResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = OnboardResult<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                warn!(
                    attempt,
                    attempts,
                    delay_ms = crate::wait::millis(delay),
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
