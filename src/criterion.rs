//! Match criteria for list classifiers.
//!
//! A [`Criterion`] identifies a class of errors. It matches an outcome when it matches the
//! error itself or any error reachable through its `source()` chain, so a criterion written
//! against a low-level error still recognises it after callers wrap it in their own types.
//!
//! ```rust
//! use retrier::Criterion;
//! use std::io;
//!
//! let timeouts = Criterion::io_kind(io::ErrorKind::TimedOut);
//! let err = io::Error::new(io::ErrorKind::TimedOut, "slow upstream");
//! assert!(timeouts.matches(&err));
//!
//! let any_io = Criterion::of_type::<io::Error>();
//! assert!(any_io.matches(&io::Error::from(io::ErrorKind::BrokenPipe)));
//! ```

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

type Predicate = dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync;

/// Predicate identifying a class of errors.
#[derive(Clone)]
pub struct Criterion {
    label: Cow<'static, str>,
    test: Arc<Predicate>,
}

impl Criterion {
    /// Any error of concrete type `T`.
    pub fn of_type<T>() -> Self
    where
        T: Error + 'static,
    {
        Self {
            label: Cow::Borrowed(std::any::type_name::<T>()),
            test: Arc::new(|err: &(dyn Error + 'static)| err.is::<T>()),
        }
    }

    /// An error of type `T` equal to `value`.
    pub fn sentinel<T>(value: T) -> Self
    where
        T: Error + PartialEq + Send + Sync + 'static,
    {
        let label = Cow::Owned(format!("{}({})", std::any::type_name::<T>(), value));
        Self {
            label,
            test: Arc::new(move |err: &(dyn Error + 'static)| {
                err.downcast_ref::<T>() == Some(&value)
            }),
        }
    }

    /// An error of type `T` for which `predicate` holds.
    pub fn when<T, F>(predicate: F) -> Self
    where
        T: Error + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            label: Cow::Borrowed(std::any::type_name::<T>()),
            test: Arc::new(move |err: &(dyn Error + 'static)| {
                err.downcast_ref::<T>().is_some_and(&predicate)
            }),
        }
    }

    /// An [`io::Error`] of the given kind.
    pub fn io_kind(kind: io::ErrorKind) -> Self {
        Self {
            label: Cow::Owned(format!("io::ErrorKind::{kind:?}")),
            test: Arc::new(move |err: &(dyn Error + 'static)| {
                err.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == kind)
            }),
        }
    }

    /// Arbitrary predicate over type-erased errors.
    pub fn custom<F>(label: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    {
        Self { label: label.into(), test: Arc::new(predicate) }
    }

    /// Whether `err`, or any error in its source chain, belongs to this criterion.
    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        let mut current = Some(err);
        while let Some(e) = current {
            if (self.test)(e) {
                return true;
            }
            current = e.source();
        }
        false
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Criterion").field(&self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    enum Sentinel {
        #[error("FOO")]
        Foo,
        #[error("BAR")]
        Bar,
    }

    #[derive(thiserror::Error, Debug)]
    #[error("request failed")]
    struct Wrapped {
        #[source]
        cause: Sentinel,
    }

    #[derive(thiserror::Error, Debug)]
    #[error("outer")]
    struct Outer(#[source] Wrapped);

    #[test]
    fn sentinel_matches_only_equal_values() {
        let foo = Criterion::sentinel(Sentinel::Foo);
        assert!(foo.matches(&Sentinel::Foo));
        assert!(!foo.matches(&Sentinel::Bar));
    }

    #[test]
    fn of_type_matches_every_value_of_type() {
        let any = Criterion::of_type::<Sentinel>();
        assert!(any.matches(&Sentinel::Foo));
        assert!(any.matches(&Sentinel::Bar));
        assert!(!any.matches(&io::Error::from(io::ErrorKind::Other)));
    }

    #[test]
    fn matches_through_source_chain() {
        let foo = Criterion::sentinel(Sentinel::Foo);
        let nested = Outer(Wrapped { cause: Sentinel::Foo });
        assert!(foo.matches(&nested));

        let other = Outer(Wrapped { cause: Sentinel::Bar });
        assert!(!foo.matches(&other));
        assert!(Criterion::of_type::<Wrapped>().matches(&other));
    }

    #[test]
    fn when_applies_typed_predicate() {
        let transient =
            Criterion::when(|e: &io::Error| matches!(e.kind(), io::ErrorKind::TimedOut));
        assert!(transient.matches(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!transient.matches(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(!transient.matches(&Sentinel::Foo));
    }

    #[test]
    fn io_kind_matches_kind() {
        let refused = Criterion::io_kind(io::ErrorKind::ConnectionRefused);
        assert!(refused.matches(&io::Error::from(io::ErrorKind::ConnectionRefused)));
        assert!(!refused.matches(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert_eq!(refused.label(), "io::ErrorKind::ConnectionRefused");
    }

    #[test]
    fn custom_predicate_sees_erased_errors() {
        let mentions_bar = Criterion::custom("mentions BAR", |e| e.to_string().contains("BAR"));
        assert!(mentions_bar.matches(&Sentinel::Bar));
        assert!(!mentions_bar.matches(&Sentinel::Foo));
        assert_eq!(format!("{mentions_bar:?}"), "Criterion(\"mentions BAR\")");
    }
}
