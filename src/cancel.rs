//! Cooperative cancellation signals.
//!
//! The executors never create or trigger a signal; they only observe one through
//! [`CancelSignal`] (and [`AsyncCancelSignal`] for the `unsync` executor). Any runtime's
//! cancellation primitive can be adapted by implementing these traits. Two signals ship with
//! the crate: [`CancelToken`], which is triggered explicitly or by a deadline, and [`Never`].
use std::future::Future;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

/// Why a signal was triggered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    /// Cancelled without a reason.
    #[error("operation cancelled")]
    Cancelled,
    /// The signal's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// Cancelled with a caller-supplied reason.
    #[error("operation cancelled: {0}")]
    Reason(String),
}

/// An externally owned request to abandon work.
pub trait CancelSignal {
    /// Whether the signal has fired.
    fn is_triggered(&self) -> bool;

    /// Block until the signal fires or `deadline` passes, whichever comes first.
    ///
    /// Returns `true` if the signal fired.
    fn wait_until_triggered_or(&self, deadline: Instant) -> bool;

    /// Why the signal fired, or `None` while it has not.
    fn reason(&self) -> Option<CancelError>;
}

/// A [`CancelSignal`] that can also be awaited.
pub trait AsyncCancelSignal: CancelSignal {
    /// Resolves once the signal has fired.
    fn cancelled(&self) -> impl Future<Output = ()>;
}

impl<S: CancelSignal + ?Sized> CancelSignal for &S {
    fn is_triggered(&self) -> bool {
        (**self).is_triggered()
    }

    fn wait_until_triggered_or(&self, deadline: Instant) -> bool {
        (**self).wait_until_triggered_or(deadline)
    }

    fn reason(&self) -> Option<CancelError> {
        (**self).reason()
    }
}

impl<S: AsyncCancelSignal + ?Sized> AsyncCancelSignal for &S {
    fn cancelled(&self) -> impl Future<Output = ()> {
        (**self).cancelled()
    }
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl CancelSignal for Never {
    fn is_triggered(&self) -> bool {
        false
    }

    fn wait_until_triggered_or(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        false
    }

    fn reason(&self) -> Option<CancelError> {
        None
    }
}

impl AsyncCancelSignal for Never {
    fn cancelled(&self) -> impl Future<Output = ()> {
        std::future::pending()
    }
}

#[derive(Debug)]
struct Inner {
    reason: Mutex<Option<CancelError>>,
    cond: Condvar,
    notify: Notify,
    deadline: Option<Instant>,
}

/// A cloneable, thread-safe cancellation signal.
///
/// All clones share the same state. The first call to [`cancel`](CancelToken::cancel) or
/// [`cancel_with`](CancelToken::cancel_with) fixes the reason; later calls are ignored. A token
/// built with a deadline fires on its own once the deadline passes, with
/// [`CancelError::DeadlineExceeded`].
///
/// ```
/// use retryx::{CancelError, CancelSignal, CancelToken};
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_triggered());
///
/// token.cancel();
/// assert_eq!(observer.reason(), Some(CancelError::Cancelled));
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create a token that fires only when cancelled.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a token that also fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// Create a token that also fires once `timeout` has elapsed.
    ///
    /// A timeout too large to represent as an [`Instant`] means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        CancelToken {
            inner: Arc::new(Inner {
                reason: Mutex::new(None),
                cond: Condvar::new(),
                notify: Notify::new(),
                deadline,
            }),
        }
    }

    /// The deadline this token fires at, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Fire the signal with [`CancelError::Cancelled`].
    pub fn cancel(&self) {
        self.trigger(CancelError::Cancelled);
    }

    /// Fire the signal with a caller-supplied reason.
    pub fn cancel_with(&self, reason: impl Into<String>) {
        self.trigger(CancelError::Reason(reason.into()));
    }

    fn trigger(&self, reason: CancelError) {
        let mut slot = self.lock();
        if slot.is_some() {
            return;
        }
        tracing::debug!(%reason, "cancellation requested");
        *slot = Some(reason);
        drop(slot);

        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancelError>> {
        self.inner
            .reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn expired(&self, now: Instant) -> bool {
        self.inner.deadline.is_some_and(|deadline| now >= deadline)
    }
}

impl CancelSignal for CancelToken {
    fn is_triggered(&self) -> bool {
        self.lock().is_some() || self.expired(Instant::now())
    }

    fn wait_until_triggered_or(&self, deadline: Instant) -> bool {
        let until = match self.inner.deadline {
            Some(own) => own.min(deadline),
            None => deadline,
        };

        let mut slot = self.lock();
        loop {
            if slot.is_some() {
                return true;
            }
            let now = Instant::now();
            if now >= until {
                if !self.expired(now) {
                    return false;
                }
                drop(slot);
                self.trigger(CancelError::DeadlineExceeded);
                return true;
            }
            slot = self
                .inner
                .cond
                .wait_timeout(slot, until - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn reason(&self) -> Option<CancelError> {
        if let Some(reason) = self.lock().clone() {
            return Some(reason);
        }
        self.expired(Instant::now())
            .then_some(CancelError::DeadlineExceeded)
    }
}

impl AsyncCancelSignal for CancelToken {
    async fn cancelled(&self) {
        let explicit = async {
            loop {
                // Register before checking so a concurrent trigger is not missed.
                let notified = self.inner.notify.notified();
                if self.lock().is_some() {
                    return;
                }
                notified.await;
            }
        };

        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = explicit => {}
                    // The runtime clock may run ahead of `Instant::now()` when paused.
                    _ = tokio::time::sleep_until(deadline.into()) => {
                        self.trigger(CancelError::DeadlineExceeded);
                    }
                }
            }
            None => explicit.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_token_is_not_triggered() {
        let token = CancelToken::new();
        assert!(!token.is_triggered());
        assert_eq!(token.reason(), None);
    }

    #[test]
    fn first_reason_wins() {
        let token = CancelToken::new();
        token.cancel_with("shutting down");
        token.cancel();
        assert_eq!(
            token.reason(),
            Some(CancelError::Reason("shutting down".into()))
        );
        assert_eq!(
            token.reason().unwrap().to_string(),
            "operation cancelled: shutting down"
        );
    }

    #[test]
    fn wait_times_out_without_trigger() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.wait_until_triggered_or(start + Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wait_wakes_on_cancel_from_other_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        assert!(token.wait_until_triggered_or(start + Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(30));
        handle.join().unwrap();
    }

    #[test]
    fn deadline_fires_token() {
        let token = CancelToken::with_timeout(Duration::from_millis(10));
        assert!(token.wait_until_triggered_or(Instant::now() + Duration::from_secs(30)));
        assert!(token.is_triggered());
        assert_eq!(token.reason(), Some(CancelError::DeadlineExceeded));
    }

    #[test]
    fn explicit_cancel_beats_deadline_reason() {
        let token = CancelToken::with_timeout(Duration::from_millis(1));
        token.cancel();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(token.reason(), Some(CancelError::Cancelled));
    }

    #[test]
    fn never_waits_full_duration() {
        let start = Instant::now();
        assert!(!Never.wait_until_triggered_or(start + Duration::from_millis(10)));
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert!(!Never.is_triggered());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.cancel();
        });
        token.cancelled().await;
        assert!(token.is_triggered());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_records_deadline_on_paused_clock() {
        let token = CancelToken::with_timeout(Duration::from_secs(10));
        token.cancelled().await;
        assert!(token.is_triggered());
        assert_eq!(token.reason(), Some(CancelError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_reason_survives_later_deadline() {
        let token = CancelToken::with_timeout(Duration::from_secs(10));
        token.cancel_with("operator");
        token.cancelled().await;
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(token.reason(), Some(CancelError::Reason("operator".into())));
    }

    #[tokio::test]
    async fn cancelled_resolves_at_deadline() {
        let token = CancelToken::with_timeout(Duration::from_millis(10));
        token.cancelled().await;
        assert_eq!(token.reason(), Some(CancelError::DeadlineExceeded));
    }
}
