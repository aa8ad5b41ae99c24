//! Backoff schedules for the retrier.
//!
//! A schedule is an explicit, ordered list of waits indexed by retry number: entry `0` is the
//! wait after the first failed attempt, entry `1` after the second, and so on. Past its end a
//! schedule holds at its final entry indefinitely. An empty schedule means "no schedule": every
//! computed wait is zero.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use retrier::schedule::{constant_backoff, limited_exponential_backoff};
//!
//! let constant = constant_backoff(3, Duration::from_millis(100));
//! assert_eq!(constant.len(), 3);
//! assert_eq!(constant.delay(7), Some(Duration::from_millis(100))); // holds at the last entry
//!
//! let capped =
//!     limited_exponential_backoff(5, Duration::from_millis(100), Duration::from_millis(350));
//! assert_eq!(
//!     capped.as_slice(),
//!     &[100, 200, 350, 350, 350].map(Duration::from_millis)
//! );
//! ```
//!
//! Overflow behavior: generated exponential entries saturate to `MAX_BACKOFF` (1 day).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Ceiling for generated exponential entries when doubling would overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Ordered, immutable sequence of backoff waits. Cloning shares the underlying storage.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BackoffSchedule {
    delays: Arc<[Duration]>,
}

impl BackoffSchedule {
    /// Build a schedule from explicit waits.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays: delays.into() }
    }

    /// The empty schedule: every computed wait is zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Wait for the given retry number, holding at the final entry once `attempt` runs past the
    /// end. `None` only for the empty schedule.
    pub fn delay(&self, attempt: usize) -> Option<Duration> {
        self.delays.get(attempt).or_else(|| self.delays.last()).copied()
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.delays
    }

    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        self.delays.iter().copied()
    }
}

impl fmt::Debug for BackoffSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.delays.iter()).finish()
    }
}

impl From<Vec<Duration>> for BackoffSchedule {
    fn from(delays: Vec<Duration>) -> Self {
        Self::new(delays)
    }
}

impl From<&[Duration]> for BackoffSchedule {
    fn from(delays: &[Duration]) -> Self {
        Self { delays: delays.into() }
    }
}

impl<const N: usize> From<[Duration; N]> for BackoffSchedule {
    fn from(delays: [Duration; N]) -> Self {
        Self::new(delays.to_vec())
    }
}

impl FromIterator<Duration> for BackoffSchedule {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self { delays: iter.into_iter().collect() }
    }
}

/// `n` identical waits of `delay`.
pub fn constant_backoff(n: usize, delay: Duration) -> BackoffSchedule {
    std::iter::repeat(delay).take(n).collect()
}

/// `n` waits doubling from `initial`: `initial * 2^i` for entry `i`.
pub fn exponential_backoff(n: usize, initial: Duration) -> BackoffSchedule {
    (0..n).map(|i| doubled(initial, i)).collect()
}

/// Like [`exponential_backoff`], with every entry capped at `limit`.
pub fn limited_exponential_backoff(
    n: usize,
    initial: Duration,
    limit: Duration,
) -> BackoffSchedule {
    (0..n).map(|i| doubled(initial, i).min(limit)).collect()
}

fn doubled(initial: Duration, exponent: usize) -> Duration {
    let exponent = exponent.min(u32::MAX as usize) as u32; // clamp to prevent truncation
    let multiplier = 2u128.saturating_pow(exponent);
    let nanos = initial.as_nanos().saturating_mul(multiplier);
    Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64)
}
