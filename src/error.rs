//! Error types for retrier configuration and cancellation.
//!
//! The retry loop itself never manufactures errors: whatever the work returns is handed back
//! unchanged. The types here cover the two places where the crate has something of its own
//! to say.

/// Invalid retrier configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Jitter ratios must lie in the closed range `[0, 1]`.
    #[error("jitter ratio must be within [0, 1] (got {0})")]
    JitterOutOfRange(f64),
}

/// Ready-made error for work functions that observe a cancelled token.
///
/// ```rust
/// use retrier::error::Cancelled;
/// use tokio_util::sync::CancellationToken;
///
/// fn check(token: &CancellationToken) -> Result<(), Cancelled> {
///     if token.is_cancelled() {
///         return Err(Cancelled);
///     }
///     Ok(())
/// }
///
/// let token = CancellationToken::new();
/// assert!(check(&token).is_ok());
/// token.cancel();
/// assert_eq!(check(&token), Err(Cancelled));
/// ```
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("operation cancelled")]
pub struct Cancelled;
