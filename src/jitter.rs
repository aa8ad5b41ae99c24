//! Proportional jitter for backoff waits.
//!
//! A jitter ratio `j` in `[0, 1]` spreads a base wait uniformly over
//! `[base * (1 - j), base * (1 + j)]`. A ratio of `0` leaves waits untouched.
//!
//! Notes:
//! - RNG: uses `rand`'s thread-local RNG by default; deterministic RNGs can be injected via
//!   `apply_with_rng`.
//! - Precision: waits are randomised at nanosecond granularity and saturate to `u64::MAX`
//!   nanoseconds to avoid panics on very large durations.
//!
//! Example:
//! ```rust
//! use retrier::Jitter;
//! use std::time::Duration;
//!
//! let jitter = Jitter::new(0.25).unwrap();
//! let wait = jitter.apply(Duration::from_millis(100));
//! assert!(wait >= Duration::from_millis(75) && wait <= Duration::from_millis(125));
//! assert!(Jitter::new(1.5).is_err());
//! ```

use crate::error::ConfigError;
use rand::{rng, Rng};
use std::time::Duration;

/// Validated jitter ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Jitter(f64);

impl Jitter {
    /// No randomisation.
    pub const NONE: Jitter = Jitter(0.0);

    /// Accepts ratios in the closed range `[0, 1]`; anything else (including NaN) is rejected.
    pub fn new(ratio: f64) -> Result<Self, ConfigError> {
        if (0.0..=1.0).contains(&ratio) {
            Ok(Jitter(ratio))
        } else {
            Err(ConfigError::JitterOutOfRange(ratio))
        }
    }

    pub fn ratio(&self) -> f64 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0.0
    }

    /// Randomise `base` using the thread-local RNG.
    pub fn apply(&self, base: Duration) -> Duration {
        if self.is_none() {
            return base;
        }
        let mut rng = rng();
        self.apply_with_rng(base, &mut rng)
    }

    /// Randomise `base` with a caller-supplied RNG (for testing).
    pub fn apply_with_rng<R: Rng>(&self, base: Duration, rng: &mut R) -> Duration {
        let nanos = Self::as_nanos_saturated(base);
        if self.is_none() || nanos == 0 {
            return base;
        }
        let spread = (nanos as f64 * self.0) as u64;
        let lower = nanos.saturating_sub(spread);
        let upper = nanos.saturating_add(spread);
        Duration::from_nanos(rng.random_range(lower..=upper))
    }

    fn as_nanos_saturated(duration: Duration) -> u64 {
        duration.as_nanos().try_into().unwrap_or(u64::MAX)
    }
}

impl TryFrom<f64> for Jitter {
    type Error = ConfigError;

    fn try_from(ratio: f64) -> Result<Self, Self::Error> {
        Jitter::new(ratio)
    }
}
