//! Convenient re-exports for common retrier types.
pub use crate::{
    classifier::{
        Action, AllowListClassifier, Classifier, DefaultClassifier, DenyListClassifier,
        ExtendableClassifier, FnClassifier, Unboxed,
    },
    config::RetrierConfig,
    criterion::Criterion,
    error::{Cancelled, ConfigError},
    jitter::Jitter,
    layer::RetrierLayer,
    retrier::{Retrier, RetrierBuilder},
    schedule::{
        constant_backoff, exponential_backoff, limited_exponential_backoff, BackoffSchedule,
        MAX_BACKOFF,
    },
    CancellationToken,
};
