//! Error types for the breaker library.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Result type for guarded calls.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

/// Error type returned by the execution guard.
///
/// The breaker subsystem introduces exactly one failure of its own, the
/// [`Open`](BreakerError::Open) rejection. Everything else is the protected
/// operation's error passed through unchanged.
#[derive(Debug)]
pub enum BreakerError<E> {
    /// The breaker is open; the call was rejected without being attempted.
    Open(OpenError),

    /// The protected operation failed. The original error is carried intact.
    Operation(E),
}

/// Diagnostic payload for a rejected call.
#[derive(Debug, Clone)]
pub struct OpenError {
    /// Label of the breaker that rejected the call.
    pub name: Arc<str>,

    /// Consecutive-failure count at the time of rejection.
    pub failure_count: u32,

    /// Instant the breaker most recently opened.
    pub opened_at: Instant,
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "breaker '{}' is open (failure_count={}, open for {:?})",
            self.name,
            self.failure_count,
            self.opened_at.elapsed()
        )
    }
}

impl Error for OpenError {}

impl<E> Display for BreakerError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakerError::Open(open) => Display::fmt(open, f),
            BreakerError::Operation(e) => Display::fmt(e, f),
        }
    }
}

impl<E: Error + 'static> Error for BreakerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BreakerError::Open(_) => None,
            BreakerError::Operation(e) => Some(e),
        }
    }
}

impl<E> BreakerError<E> {
    /// Returns true if this is the open-breaker rejection.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open(_))
    }

    /// Returns the underlying operation error, if any.
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Open(_) => None,
            BreakerError::Operation(e) => Some(e),
        }
    }
}
