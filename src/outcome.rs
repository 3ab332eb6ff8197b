use crate::cancel::{CancelError, CancelSignal};
use crate::Error;

/// How a retry sequence ended.
///
/// `attempts` counts the operation invocations actually made. It never exceeds the configured
/// number of attempts and is zero only when cancellation was observed before the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T, E> {
    /// Operation invocations made.
    pub attempts: u32,
    /// The operation's value, or why the sequence ended without one.
    pub result: Result<T, Error<E>>,
}

impl<T, E> Outcome<T, E> {
    pub(crate) fn success(attempts: u32, value: T) -> Self {
        Outcome {
            attempts,
            result: Ok(value),
        }
    }

    pub(crate) fn exhausted(attempts: u32, err: E) -> Self {
        Outcome {
            attempts,
            result: Err(Error::Operation(err)),
        }
    }

    pub(crate) fn cancelled<S>(signal: &S, attempts: u32) -> Self
    where
        S: CancelSignal + ?Sized,
    {
        let reason = signal.reason().unwrap_or(CancelError::Cancelled);
        tracing::debug!(attempts, %reason, "retry cancelled");
        Outcome {
            attempts,
            result: Err(Error::Cancelled(reason)),
        }
    }

    /// The error that ended the sequence, or `None` if it succeeded.
    pub fn last_error(&self) -> Option<&Error<E>> {
        self.result.as_ref().err()
    }

    /// Whether the operation eventually succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the sequence stopped because the cancellation signal fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, Err(Error::Cancelled(_)))
    }

    /// Whether every allowed attempt failed.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.result, Err(Error::Operation(_)))
    }

    /// Consume the outcome, keeping only the result.
    pub fn into_result(self) -> Result<T, Error<E>> {
        self.result
    }
}
