//! Wait Mechanisms
//!
//! Bounded polling used by every page primitive. Nothing in the crate waits
//! without a deadline: a [`WaitOptions`] always carries one.
//!
//! Time comes from `tokio::time`, so tests run on a paused clock and a 120 s
//! availability poll finishes instantly.

use crate::result::OnboardResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default explicit wait for native pages (30 seconds)
pub const DEFAULT_NATIVE_WAIT_MS: u64 = 30_000;

/// Default explicit wait for web pages (15 seconds)
pub const DEFAULT_WEB_WAIT_MS: u64 = 15_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Short wait used for the primary selector of a fallback pair (3 seconds)
pub const FALLBACK_PROBE_MS: u64 = 3_000;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_NATIVE_WAIT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the given timeout and the default poll interval
    #[must_use]
    pub const fn timeout_of(timeout: Duration) -> Self {
        Self {
            timeout_ms: timeout.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The condition produced a value
    Ready(T),
    /// The deadline passed first
    TimedOut {
        /// Time spent polling
        elapsed: Duration,
    },
}

impl<T> WaitOutcome<T> {
    /// Whether the condition was met
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Convert into an option, discarding the elapsed time
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::TimedOut { .. } => None,
        }
    }
}

/// Poll `check` until it yields `Some`, or the timeout elapses.
///
/// The condition is always evaluated at least once, even with a zero
/// timeout. Errors from `check` abort the wait immediately.
///
/// # Errors
///
/// Returns the first error produced by `check`.
pub async fn poll_until<T, F, Fut>(options: WaitOptions, mut check: F) -> OnboardResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = OnboardResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();

    loop {
        if let Some(value) = check().await? {
            return Ok(WaitOutcome::Ready(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitOutcome::TimedOut {
                elapsed: now - start,
            });
        }
        let remaining = deadline - now;
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}

/// Suspend for a fixed duration
pub async fn pause(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Milliseconds in a duration, saturating
#[must_use]
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_NATIVE_WAIT_MS);
            assert_eq!(opts.poll_interval(), Duration::from_millis(250));
        }

        #[test]
        fn test_builder() {
            let opts = WaitOptions::new()
                .with_timeout(5_000)
                .with_poll_interval(100);
            assert_eq!(opts.timeout(), Duration::from_secs(5));
            assert_eq!(opts.poll_interval_ms, 100);
        }

        #[test]
        fn test_timeout_of() {
            let opts = WaitOptions::timeout_of(Duration::from_secs(3));
            assert_eq!(opts.timeout_ms, 3_000);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_ready_on_third_check() {
            let calls = AtomicUsize::new(0);
            let outcome = poll_until(WaitOptions::new().with_timeout(10_000), || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok((n == 3).then_some(n)) }
            })
            .await
            .unwrap();
            assert_eq!(outcome, WaitOutcome::Ready(3));
        }

        #[tokio::test(start_paused = true)]
        async fn test_times_out_at_deadline() {
            let outcome: WaitOutcome<()> =
                poll_until(WaitOptions::new().with_timeout(3_000), || async { Ok(None) })
                    .await
                    .unwrap();
            match outcome {
                WaitOutcome::TimedOut { elapsed } => {
                    assert_eq!(elapsed, Duration::from_secs(3));
                }
                WaitOutcome::Ready(()) => panic!("expected timeout"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_timeout_checks_once() {
            let calls = AtomicUsize::new(0);
            let outcome: WaitOutcome<()> = poll_until(WaitOptions::new().with_timeout(0), || {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await
            .unwrap();
            assert!(!outcome.is_ready());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_error_aborts_wait() {
            let result: OnboardResult<WaitOutcome<()>> =
                poll_until(WaitOptions::new(), || async {
                    Err(crate::result::OnboardError::driver("find_element", "boom"))
                })
                .await;
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
