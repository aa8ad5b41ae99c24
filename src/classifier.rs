//! Outcome classification.
//!
//! A [`Classifier`] maps the outcome of one attempt to an [`Action`]. The outcome is `None`
//! when the work succeeded and `Some(&err)` when it failed. Every built-in classifier returns
//! [`Action::Succeed`] for `None` before looking at anything else.
//!
//! Ready-made classifiers:
//! - [`DefaultClassifier`]: every error retries; never fails permanently.
//! - [`AllowListClassifier`]: errors matching a registered [`Criterion`] retry, the rest fail.
//! - [`DenyListClassifier`]: errors matching a registered [`Criterion`] fail, the rest retry.
//! - [`FnClassifier`]: any closure.
//! - [`Unboxed`]: any of the above applied to errors behind a `Box` or `Arc`.
//!
//! The list classifiers implement [`ExtendableClassifier`] and accept new criteria at runtime,
//! concurrently with classification. Cloning a list classifier yields a handle to the same
//! criteria.
//!
//! ```rust
//! use retrier::{Action, AllowListClassifier, Classifier, Criterion, ExtendableClassifier};
//! use std::io;
//!
//! let classifier = AllowListClassifier::new([Criterion::io_kind(io::ErrorKind::TimedOut)]);
//! let timeout = io::Error::from(io::ErrorKind::TimedOut);
//! let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
//!
//! assert_eq!(classifier.classify(None::<&io::Error>), Action::Succeed);
//! assert_eq!(classifier.classify(Some(&timeout)), Action::Retry);
//! assert_eq!(classifier.classify(Some(&refused)), Action::Fail);
//!
//! classifier.append(Criterion::io_kind(io::ErrorKind::ConnectionRefused));
//! assert_eq!(classifier.classify(Some(&refused)), Action::Retry);
//! ```

use crate::criterion::Criterion;
use std::error::Error;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

/// Verdict for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Treat the outcome as a success and stop.
    Succeed,
    /// Treat the outcome as a hard failure and stop without retrying.
    Fail,
    /// Treat the outcome as a soft failure and retry after backoff.
    Retry,
}

impl Action {
    /// `Succeed` and `Fail` end the retry loop.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Action::Retry)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Succeed => write!(f, "succeed"),
            Action::Fail => write!(f, "fail"),
            Action::Retry => write!(f, "retry"),
        }
    }
}

/// Policy mapping an outcome to an [`Action`].
///
/// Implementations must return [`Action::Succeed`] for `None`.
pub trait Classifier<E: ?Sized>: Send + Sync {
    fn classify(&self, outcome: Option<&E>) -> Action;
}

/// Classifier whose match criteria can be extended at runtime.
pub trait ExtendableClassifier {
    /// Register one more criterion. Safe to call concurrently with classification.
    fn append(&self, criterion: Criterion);
}

/// `None` → `Succeed`, any error → `Retry`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultClassifier;

impl<E: ?Sized> Classifier<E> for DefaultClassifier {
    fn classify(&self, outcome: Option<&E>) -> Action {
        match outcome {
            None => Action::Succeed,
            Some(_) => Action::Retry,
        }
    }
}

/// Errors the list classifiers can inspect.
///
/// Implemented for every sized `Error + 'static` type and for the `dyn Error` trait objects.
/// Boxed trait objects are reached through [`Unboxed`].
pub trait AsDynError {
    fn as_dyn_error(&self) -> &(dyn Error + 'static);
}

impl<E: Error + 'static> AsDynError for E {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl AsDynError for dyn Error + 'static {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl AsDynError for dyn Error + Send + 'static {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl AsDynError for dyn Error + Send + Sync + 'static {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

/// Criteria shared between clones of a list classifier.
#[derive(Default)]
struct CriteriaList {
    criteria: RwLock<Vec<Criterion>>,
}

impl CriteriaList {
    fn new(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Self { criteria: RwLock::new(criteria.into_iter().collect()) }
    }

    fn push(&self, criterion: Criterion) {
        self.criteria.write().unwrap_or_else(PoisonError::into_inner).push(criterion);
    }

    fn any_match(&self, err: &(dyn Error + 'static)) -> bool {
        let guard = self.criteria.read().unwrap_or_else(PoisonError::into_inner);
        guard.iter().any(|c| c.matches(err))
    }

    fn len(&self) -> usize {
        self.criteria.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl fmt::Debug for CriteriaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.criteria.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list().entries(guard.iter()).finish()
    }
}

macro_rules! list_classifier {
    ($(#[$meta:meta])* $name:ident, on_match = $hit:expr, otherwise = $miss:expr) => {
        $(#[$meta])*
        #[derive(Clone, Default)]
        pub struct $name {
            list: Arc<CriteriaList>,
        }

        impl $name {
            /// Create a classifier from an initial set of criteria (possibly empty).
            pub fn new(criteria: impl IntoIterator<Item = Criterion>) -> Self {
                Self { list: Arc::new(CriteriaList::new(criteria)) }
            }

            /// Number of registered criteria.
            pub fn len(&self) -> usize {
                self.list.len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// A handle on the same criteria that classifies boxed or shared errors
            /// (`Box<dyn Error + Send + Sync>`, `Arc<E>`, ...) by what they point to.
            pub fn unboxed(&self) -> Unboxed<Self> {
                Unboxed::new(self.clone())
            }
        }

        impl<E> Classifier<E> for $name
        where
            E: AsDynError + ?Sized,
        {
            fn classify(&self, outcome: Option<&E>) -> Action {
                let Some(err) = outcome else {
                    return Action::Succeed;
                };
                if self.list.any_match(err.as_dyn_error()) {
                    $hit
                } else {
                    $miss
                }
            }
        }

        impl ExtendableClassifier for $name {
            fn append(&self, criterion: Criterion) {
                self.list.push(criterion);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).field("criteria", &self.list).finish()
            }
        }
    };
}

list_classifier!(
    /// `None` → `Succeed`; errors matching a criterion → `Retry`; everything else → `Fail`.
    ///
    /// With no criteria every error is a hard failure.
    AllowListClassifier,
    on_match = Action::Retry,
    otherwise = Action::Fail
);

list_classifier!(
    /// `None` → `Succeed`; errors matching a criterion → `Fail`; everything else → `Retry`.
    DenyListClassifier,
    on_match = Action::Fail,
    otherwise = Action::Retry
);

/// Classifier backed by a closure.
///
/// The closure only sees errors: a successful outcome is always `Succeed`.
pub struct FnClassifier<F> {
    f: F,
}

impl<F> FnClassifier<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnClassifier<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnClassifier").field("f", &"<closure>").finish()
    }
}

impl<E, F> Classifier<E> for FnClassifier<F>
where
    E: ?Sized,
    F: Fn(Option<&E>) -> Action + Send + Sync,
{
    fn classify(&self, outcome: Option<&E>) -> Action {
        match outcome {
            None => Action::Succeed,
            Some(_) => (self.f)(outcome),
        }
    }
}

/// Classifies errors behind a pointer (`Box`, `Arc`, ...) with the classifier for the
/// pointee.
///
/// ```rust
/// use retrier::{Action, AllowListClassifier, Classifier, Criterion};
/// use std::error::Error;
/// use std::io;
///
/// let allow = AllowListClassifier::new([Criterion::io_kind(io::ErrorKind::TimedOut)]);
/// let boxed = allow.unboxed();
/// let err: Box<dyn Error + Send + Sync> = Box::new(io::Error::from(io::ErrorKind::TimedOut));
/// assert_eq!(boxed.classify(Some(&err)), Action::Retry);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Unboxed<C> {
    inner: C,
}

impl<C> Unboxed<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<P, C> Classifier<P> for Unboxed<C>
where
    P: Deref,
    C: Classifier<P::Target>,
{
    fn classify(&self, outcome: Option<&P>) -> Action {
        self.inner.classify(outcome.map(|ptr| &**ptr))
    }
}

/// An absent classifier behaves as [`DefaultClassifier`].
impl<E, C> Classifier<E> for Option<C>
where
    E: ?Sized,
    C: Classifier<E>,
{
    fn classify(&self, outcome: Option<&E>) -> Action {
        match self {
            Some(classifier) => classifier.classify(outcome),
            None => DefaultClassifier.classify(outcome),
        }
    }
}

impl<E, C> Classifier<E> for Arc<C>
where
    E: ?Sized,
    C: Classifier<E> + ?Sized,
{
    fn classify(&self, outcome: Option<&E>) -> Action {
        (**self).classify(outcome)
    }
}

impl<E, C> Classifier<E> for Box<C>
where
    E: ?Sized,
    C: Classifier<E> + ?Sized,
{
    fn classify(&self, outcome: Option<&E>) -> Action {
        (**self).classify(outcome)
    }
}
