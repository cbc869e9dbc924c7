//! Backoff and the overall retry deadline.
//!
//! Transient failures (500/503/504, transport timeouts, quota signals) are
//! retried with exponentially growing, jittered delays until the cumulative
//! retry timeout runs out. There is no attempt cap: the deadline is the only
//! bound.

use crate::Error;
use rand::Rng;
use std::time::{Duration, Instant};

/// Delay schedule between attempts.
///
/// The delay before retry `n` (1-indexed) is
/// `initial_delay * multiplier^(n - 1)`, multiplied by a uniform factor in
/// `[0.5, 1.5)` when jitter is enabled.
///
/// # Examples
///
/// ```
/// use mapcall::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff {
///     jitter: false,
///     ..Backoff::default()
/// };
///
/// assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(500));
/// assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(750));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// The delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor applied for each further retry.
    pub multiplier: f64,
    /// Whether to randomize each delay by ±50%.
    pub jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            jitter: true,
        }
    }
}

impl Backoff {
    /// Returns the delay before the given retry attempt (1-indexed).
    ///
    /// Attempt `0` is the initial request and never waits.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        let delay = Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX);

        if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..1.5);
            Duration::try_from_secs_f64(delay.as_secs_f64() * jitter_factor)
                .unwrap_or(Duration::MAX)
        } else {
            delay
        }
    }
}

/// Per-call retry state: the attempt counter and the deadline.
///
/// Created when a call starts and dropped when it ends. Each attempt first
/// passes through [`RetryState::begin_attempt`], which either refuses (the
/// deadline has passed) or hands back the backoff delay to sleep first.
#[derive(Debug)]
pub(crate) struct RetryState {
    attempt: usize,
    first_attempt: Instant,
    retry_timeout: Duration,
    last_error: Option<Error>,
}

impl RetryState {
    pub(crate) fn new(retry_timeout: Duration) -> Self {
        Self::starting_at(Instant::now(), retry_timeout)
    }

    fn starting_at(first_attempt: Instant, retry_timeout: Duration) -> Self {
        Self {
            attempt: 0,
            first_attempt,
            retry_timeout,
            last_error: None,
        }
    }

    /// Gate for the next attempt.
    ///
    /// Returns `Err(Error::TimeoutExceeded)` once the retry timeout has elapsed
    /// since the first attempt, otherwise the delay to wait before sending.
    pub(crate) fn begin_attempt(&mut self, backoff: &Backoff) -> Result<Duration, Error> {
        self.begin_attempt_at(Instant::now(), backoff)
    }

    fn begin_attempt_at(&mut self, now: Instant, backoff: &Backoff) -> Result<Duration, Error> {
        let elapsed = now.saturating_duration_since(self.first_attempt);
        if elapsed > self.retry_timeout {
            return Err(Error::TimeoutExceeded {
                attempts: self.attempt,
                elapsed,
                last_error: self.last_error.take().map(Box::new),
            });
        }
        Ok(backoff.delay_for_attempt(self.attempt))
    }

    /// Records a transient failure and moves on to the next attempt.
    pub(crate) fn retry(&mut self, error: Error) {
        self.attempt += 1;
        self.last_error = Some(error);
    }

    /// Number of attempts started so far, including the current one.
    pub(crate) fn attempts(&self) -> usize {
        self.attempt + 1
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.first_attempt.elapsed()
    }
}
