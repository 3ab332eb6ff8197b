use crate::CancelError;

/// Why a retry sequence ended without success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    /// Every attempt failed; holds the error from the last one.
    #[error("{0}")]
    Operation(E),
    /// The cancellation signal fired before an attempt or during a wait.
    #[error(transparent)]
    Cancelled(#[from] CancelError),
}

impl<E> Error<E> {
    /// The operation's error, if the sequence ended by exhaustion.
    pub fn operation(&self) -> Option<&E> {
        match self {
            Error::Operation(err) => Some(err),
            Error::Cancelled(_) => None,
        }
    }

    /// The cancellation reason, if the sequence was cancelled.
    pub fn cancelled(&self) -> Option<&CancelError> {
        match self {
            Error::Operation(_) => None,
            Error::Cancelled(reason) => Some(reason),
        }
    }

    /// Take the operation's error, if the sequence ended by exhaustion.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Error::Operation(err) => Some(err),
            Error::Cancelled(_) => None,
        }
    }
}
