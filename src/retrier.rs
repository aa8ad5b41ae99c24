//! Retrier implementation
//!
//! Drives fallible async work against a backoff schedule.
//!
//! Semantics:
//! - Each attempt's outcome is handed to the classifier (`None` for `Ok`, `Some(&err)` for
//!   `Err`). `Succeed` and `Fail` end the loop and return the attempt's own `Result` untouched;
//!   `Retry` waits `calc_sleep(n)` for the `n`-th retry and runs the work again.
//! - The schedule holds at its final entry once retries outrun it. Without
//!   `stop_after_schedule` the loop is unbounded: ending it is the classifier's job.
//! - `run_ctx` races every backoff wait against a `CancellationToken`. Cancellation wins ties
//!   and stops the loop with the last outcome. Checking the token inside the work is the
//!   work's responsibility.
//! - Jitter is the only state mutable after construction; it is read and written under one lock.
//!
//! Invariants:
//! - Attempts within one call are strictly sequential.
//! - Errors are returned exactly as the work produced them.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use retrier::{constant_backoff, AllowListClassifier, Criterion, Retrier};
//!
//! #[derive(Debug, PartialEq, thiserror::Error)]
//! #[error("busy")]
//! struct Busy;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let classifier = AllowListClassifier::new([Criterion::of_type::<Busy>()]);
//! let retrier = Retrier::new(constant_backoff(3, Duration::from_millis(1)), classifier);
//!
//! let mut calls = 0;
//! let result = retrier
//!     .run(|| {
//!         calls += 1;
//!         let busy = calls < 3;
//!         async move { if busy { Err(Busy) } else { Ok("done") } }
//!     })
//!     .await;
//! assert_eq!(result, Ok("done"));
//! assert_eq!(calls, 3);
//! # });
//! ```

use crate::classifier::{Action, Classifier, DefaultClassifier};
use crate::config::RetrierConfig;
use crate::error::ConfigError;
use crate::jitter::Jitter;
use crate::schedule::BackoffSchedule;
use crate::sleeper::{Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry driver combining a backoff schedule, a classifier, jitter, and a sleeper.
///
/// A single instance is meant to be shared (for example behind an `Arc`) and used by many
/// concurrent `run`/`run_ctx` calls.
pub struct Retrier<E> {
    schedule: BackoffSchedule,
    classifier: Arc<dyn Classifier<E>>,
    jitter: Mutex<Jitter>,
    sleeper: Arc<dyn Sleeper>,
    stop_after_schedule: bool,
}

impl<E> std::fmt::Debug for Retrier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier")
            .field("schedule", &self.schedule)
            .field("jitter", &self.jitter())
            .field("stop_after_schedule", &self.stop_after_schedule)
            .field("sleeper", &self.sleeper)
            .field("classifier", &"<classifier>")
            .finish()
    }
}

impl<E> Retrier<E> {
    /// Create a retrier with no jitter, real sleeps, and no retry bound.
    ///
    /// Pass `None::<C>` (any classifier type) for the default classification.
    pub fn new<C>(schedule: impl Into<BackoffSchedule>, classifier: C) -> Self
    where
        C: Classifier<E> + 'static,
    {
        Self {
            schedule: schedule.into(),
            classifier: Arc::new(classifier),
            jitter: Mutex::new(Jitter::NONE),
            sleeper: Arc::new(TokioSleeper),
            stop_after_schedule: false,
        }
    }

    /// Construct a new builder with defaults.
    pub fn builder() -> RetrierBuilder<E> {
        RetrierBuilder::new()
    }

    /// Build a retrier from plain configuration values.
    pub fn from_config<C>(config: &RetrierConfig, classifier: C) -> Result<Self, ConfigError>
    where
        C: Classifier<E> + 'static,
    {
        config.builder().classifier(classifier).build()
    }

    pub fn schedule(&self) -> &BackoffSchedule {
        &self.schedule
    }

    /// Current jitter ratio.
    pub fn jitter(&self) -> f64 {
        self.jitter.lock().unwrap_or_else(PoisonError::into_inner).ratio()
    }

    /// Set the jitter ratio. Values outside `[0, 1]` are ignored and the current ratio is kept.
    pub fn set_jitter(&self, ratio: f64) {
        if let Err(err) = self.try_set_jitter(ratio) {
            warn!(target: "retrier", %err, "ignoring invalid jitter ratio");
        }
    }

    /// Set the jitter ratio, reporting values outside `[0, 1]`.
    pub fn try_set_jitter(&self, ratio: f64) -> Result<(), ConfigError> {
        let jitter = Jitter::new(ratio)?;
        *self.jitter.lock().unwrap_or_else(PoisonError::into_inner) = jitter;
        Ok(())
    }

    /// Wait before retry number `attempt` (0-based), jitter included.
    pub fn calc_sleep(&self, attempt: usize) -> Duration {
        let Some(base) = self.schedule.delay(attempt) else {
            return Duration::ZERO;
        };
        let jitter = self.jitter.lock().unwrap_or_else(PoisonError::into_inner);
        jitter.apply(base)
    }

    /// Run `work` until the classifier returns `Succeed` or `Fail`.
    pub async fn run<T, Fut, Op>(&self, work: Op) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(None, work).await
    }

    /// Like [`run`](Self::run), but backoff waits end early when `token` is cancelled.
    ///
    /// `work` receives a clone of the token on every attempt and should return an error of its
    /// own (for example [`Cancelled`](crate::error::Cancelled)) when it observes cancellation.
    pub async fn run_ctx<T, Fut, Op>(&self, token: &CancellationToken, mut work: Op) -> Result<T, E>
    where
        Op: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(Some(token), || work(token.clone())).await
    }

    async fn drive<T, Fut, Op>(
        &self,
        cancel: Option<&CancellationToken>,
        mut work: Op,
    ) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries: usize = 0;
        loop {
            let outcome = work().await;
            let action = self.classifier.classify(outcome.as_ref().err());
            match action {
                Action::Succeed => return outcome,
                Action::Fail => {
                    debug!(target: "retrier", retries, "hard failure, not retrying");
                    return outcome;
                }
                Action::Retry => {
                    if self.stop_after_schedule && retries >= self.schedule.len() {
                        debug!(target: "retrier", retries, "backoff schedule exhausted");
                        return outcome;
                    }
                    let delay = self.calc_sleep(retries);
                    debug!(
                        target: "retrier",
                        retry = retries.saturating_add(1),
                        ?delay,
                        "soft failure, retrying"
                    );
                    if !self.wait(delay, cancel).await {
                        debug!(target: "retrier", retries, "cancelled during backoff");
                        return outcome;
                    }
                    retries = retries.saturating_add(1);
                }
            }
        }
    }

    /// Returns `false` if the wait was cut short by cancellation.
    async fn wait(&self, delay: Duration, cancel: Option<&CancellationToken>) -> bool {
        let sleep = self.sleeper.sleep(delay);
        match cancel {
            None => {
                sleep.await;
                true
            }
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = sleep => true,
            },
        }
    }
}

/// Builder for [`Retrier`].
pub struct RetrierBuilder<E> {
    schedule: BackoffSchedule,
    classifier: Arc<dyn Classifier<E>>,
    jitter: f64,
    sleeper: Arc<dyn Sleeper>,
    stop_after_schedule: bool,
}

impl<E> RetrierBuilder<E> {
    /// Empty schedule, default classifier, no jitter, real sleeps, unbounded retries.
    pub fn new() -> Self {
        Self {
            schedule: BackoffSchedule::empty(),
            classifier: Arc::new(DefaultClassifier),
            jitter: 0.0,
            sleeper: Arc::new(TokioSleeper),
            stop_after_schedule: false,
        }
    }

    pub fn schedule(mut self, schedule: impl Into<BackoffSchedule>) -> Self {
        self.schedule = schedule.into();
        self
    }

    pub fn classifier<C>(mut self, classifier: C) -> Self
    where
        C: Classifier<E> + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Initial jitter ratio; validated by [`build`](Self::build).
    pub fn jitter(mut self, ratio: f64) -> Self {
        self.jitter = ratio;
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Stop retrying once every schedule entry has been used once, returning the last outcome.
    /// With an empty schedule this disables retries entirely.
    pub fn stop_after_schedule(mut self, stop: bool) -> Self {
        self.stop_after_schedule = stop;
        self
    }

    /// Build the retrier, validating inputs.
    pub fn build(self) -> Result<Retrier<E>, ConfigError> {
        let jitter = Jitter::new(self.jitter)?;
        Ok(Retrier {
            schedule: self.schedule,
            classifier: self.classifier,
            jitter: Mutex::new(jitter),
            sleeper: self.sleeper,
            stop_after_schedule: self.stop_after_schedule,
        })
    }
}

impl<E> Default for RetrierBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
