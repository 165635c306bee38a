//! Retry policy: bounded attempts, an elapsed-time budget, and exponential
//! backoff between retry-eligible attempts.
//!
//! The policy is a plain configuration struct; the actual loop lives in the
//! client. Whichever bound trips first (attempt count or wall-clock budget)
//! ends the loop.

use std::time::Duration;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Default wall-clock budget for the whole call, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default multiplier applied to the exponential term.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Default exponent base. Must be greater than 1.0; lower values fit more
/// attempts into the same time budget.
pub const DEFAULT_EXP_BASE: f64 = 1.2;

/// Default floor for a single backoff wait.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(1);

/// Default ceiling for a single backoff wait.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);

/// Bounds and backoff shape for the retry loop.
///
/// The wait before retrying after the `n`-th failed attempt is
/// `multiplier * exp_base^n`, clamped to `[min_wait, max_wait]`. The loop
/// stops once `max_retries + 1` attempts have failed or `timeout` of
/// wall-clock time has elapsed, whichever comes first.
///
/// # Examples
///
/// ```
/// use everstream::RetryPolicy;
/// use std::time::Duration;
///
/// // The stock policy: 8 retries inside a 10 second budget, waits
/// // growing on a 1.2 curve between 1 and 5 seconds.
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_retries, 8);
///
/// // A more impatient variant.
/// let policy = RetryPolicy {
///     max_retries: 2,
///     timeout: Duration::from_secs(3),
///     ..RetryPolicy::default()
/// };
/// assert!(policy.should_stop(3, Duration::from_millis(10)));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    /// Zero means a single attempt with no retries.
    pub max_retries: u32,

    /// Wall-clock budget for the whole call. Checked between attempts;
    /// it does not preempt an attempt already in flight.
    pub timeout: Duration,

    /// Multiplier applied to the exponential backoff term.
    pub multiplier: f64,

    /// Base of the exponential backoff curve. Must be greater than 1.0.
    pub exp_base: f64,

    /// Floor for a single backoff wait.
    pub min_wait: Duration,

    /// Ceiling for a single backoff wait.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            multiplier: DEFAULT_MULTIPLIER,
            exp_base: DEFAULT_EXP_BASE,
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff wait after the given failed attempt (1-based).
    ///
    /// The sequence is non-decreasing until it reaches `max_wait`, then
    /// stays clamped there.
    pub fn wait_before(&self, attempt: u32) -> Duration {
        let exp = self.exp_base.powi(attempt.min(1024) as i32);
        let capped = (self.multiplier * exp).min(self.max_wait.as_secs_f64());
        Duration::from_secs_f64(capped.max(self.min_wait.as_secs_f64()).max(0.0))
    }

    /// Returns `true` once the loop must stop without another attempt.
    ///
    /// `attempts` is the number of attempts that have already run and
    /// failed; `elapsed` is wall-clock time since the call started.
    pub fn should_stop(&self, attempts: u32, elapsed: Duration) -> bool {
        attempts >= self.max_retries.saturating_add(1) || elapsed >= self.timeout
    }

    /// Returns a copy of this policy with per-call overrides applied.
    ///
    /// `None` keeps the configured value. A non-finite or negative
    /// `timeout_seconds` is ignored and the configured budget kept.
    pub fn with_overrides(
        &self,
        timeout_seconds: Option<f64>,
        num_retries: Option<u32>,
    ) -> RetryPolicy {
        let mut policy = self.clone();
        if let Some(retries) = num_retries {
            policy.max_retries = retries;
        }
        if let Some(seconds) = timeout_seconds {
            if let Ok(timeout) = Duration::try_from_secs_f64(seconds) {
                policy.timeout = timeout;
            }
        }
        policy
    }
}
