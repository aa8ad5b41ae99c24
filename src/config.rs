//! Plain configuration values for a [`Retrier`](crate::Retrier).
//!
//! `RetrierConfig` carries everything except the classifier, which is code rather than data.
//! With the `serde` feature it can be loaded from any serde format:
//!
//! ```rust
//! use retrier::{DefaultClassifier, Retrier, RetrierConfig};
//! use std::time::Duration;
//!
//! let config = RetrierConfig {
//!     schedule_ms: vec![0, 100, 1_000],
//!     jitter: 0.2,
//!     stop_after_schedule: true,
//! };
//! let retrier: Retrier<std::io::Error> =
//!     Retrier::from_config(&config, DefaultClassifier).unwrap();
//! assert_eq!(retrier.schedule().delay(1), Some(Duration::from_millis(100)));
//! assert_eq!(retrier.jitter(), 0.2);
//! ```

use crate::error::ConfigError;
use crate::jitter::Jitter;
use crate::retrier::RetrierBuilder;
use crate::schedule::BackoffSchedule;
use std::time::Duration;

/// Retrier settings as plain data.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RetrierConfig {
    /// Backoff waits in milliseconds, one per retry.
    pub schedule_ms: Vec<u64>,
    /// Jitter ratio in `[0, 1]`.
    pub jitter: f64,
    /// Give up once every schedule entry has been used.
    pub stop_after_schedule: bool,
}

impl RetrierConfig {
    pub fn schedule(&self) -> BackoffSchedule {
        self.schedule_ms.iter().copied().map(Duration::from_millis).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Jitter::new(self.jitter).map(|_| ())
    }

    /// A builder preloaded with these settings and the default classifier.
    pub fn builder<E>(&self) -> RetrierBuilder<E> {
        RetrierBuilder::new()
            .schedule(self.schedule())
            .jitter(self.jitter)
            .stop_after_schedule(self.stop_after_schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DefaultClassifier;
    use crate::retrier::Retrier;

    #[test]
    fn default_config_is_empty_and_valid() {
        let config = RetrierConfig::default();
        assert!(config.schedule().is_empty());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn schedule_converts_milliseconds() {
        let config = RetrierConfig { schedule_ms: vec![0, 10, 250], ..Default::default() };
        assert_eq!(config.schedule().as_slice(), &[0, 10, 250].map(Duration::from_millis));
    }

    #[test]
    fn invalid_jitter_is_rejected() {
        let config = RetrierConfig { jitter: 3.0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::JitterOutOfRange(3.0)));
        let err = Retrier::<std::io::Error>::from_config(&config, DefaultClassifier).unwrap_err();
        assert_eq!(err, ConfigError::JitterOutOfRange(3.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_json() {
        let config: RetrierConfig =
            serde_json::from_str(r#"{"schedule_ms":[5,50],"jitter":0.5}"#).expect("valid json");
        assert_eq!(config.schedule_ms, vec![5, 50]);
        assert_eq!(config.jitter, 0.5);
        assert!(!config.stop_after_schedule);

        let err = serde_json::from_str::<RetrierConfig>(r#"{"retries":3}"#);
        assert!(err.is_err(), "unknown fields are rejected");
    }
}
