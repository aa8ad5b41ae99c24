#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # retrier
//!
//! Classifier-driven retries for async Rust.
//!
//! A [`Retrier`] runs fallible work, asks a [`Classifier`] what each outcome means, and either
//! stops (success or hard failure) or waits according to a [`BackoffSchedule`] and tries again.
//!
//! ## Features
//!
//! - **Classifiers** deciding `Succeed`, `Fail`, or `Retry` per outcome: default, allow-list,
//!   deny-list, or any closure
//! - **Criteria** matching errors by type, sentinel value, `io::ErrorKind`, or predicate,
//!   anywhere in the `source()` chain
//! - **Explicit backoff schedules** (constant, exponential, capped exponential) that hold at
//!   their last entry
//! - **Proportional jitter**, adjustable at runtime
//! - **Cancellation** of backoff waits through `tokio_util`'s `CancellationToken`
//! - **Tower layer** for wrapping services
//!
//! ## Quick Start
//!
//! ```rust
//! use retrier::{constant_backoff, Criterion, DenyListClassifier, Retrier};
//! use std::io;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let classifier = DenyListClassifier::new([Criterion::io_kind(io::ErrorKind::NotFound)]);
//!     let retrier = Retrier::new(constant_backoff(3, Duration::from_millis(10)), classifier);
//!     retrier.set_jitter(0.25);
//!
//!     let result = retrier
//!         .run(|| async {
//!             // Your async operation here
//!             Ok::<_, io::Error>(())
//!         })
//!         .await;
//!     assert!(result.is_ok());
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod criterion;
pub mod error;
pub mod jitter;
pub mod layer;
pub mod prelude;
pub mod retrier;
pub mod schedule;
pub mod sleeper;

// Re-exports
pub use classifier::{
    Action, AllowListClassifier, AsDynError, Classifier, DefaultClassifier, DenyListClassifier,
    ExtendableClassifier, FnClassifier, Unboxed,
};
pub use config::RetrierConfig;
pub use criterion::Criterion;
pub use error::{Cancelled, ConfigError};
pub use jitter::Jitter;
pub use layer::{RetrierLayer, RetrierService};
pub use retrier::{Retrier, RetrierBuilder};
pub use schedule::{
    constant_backoff, exponential_backoff, limited_exponential_backoff, BackoffSchedule,
};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use tokio_util::sync::CancellationToken;
