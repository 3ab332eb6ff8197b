//! Asynchronous retry executor for tokio, with cancellable backoff sleeps.
use std::future::Future;
use std::time::Duration;

use crate::cancel::AsyncCancelSignal;
use crate::{Config, Outcome, strategy};

/// Execute an asynchronous operation and retry it with capped exponential backoff until it
/// succeeds, the attempts run out, or `signal` fires.
///
/// Behaves exactly like [`sync::execute`](crate::sync::execute), except that the operation is a
/// factory of futures and the backoff wait is a [`tokio::time::sleep`] raced against
/// [`AsyncCancelSignal::cancelled`]. The future of an attempt in progress is always driven to
/// completion; cancellation is observed before the next attempt or during the wait.
///
/// # Parameters
///
/// * `signal` - The cancellation signal to observe.
/// * `config` - Retry tuning; unset fields take their defaults.
/// * `operation` - The operation to execute, typically a closure that returns a `Future`
///   which resolves to a value convertible to `Result`.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use retryx::{CancelToken, Config, unsync::execute};
///
/// #[tokio::main]
/// async fn main() {
///     let token = CancelToken::new();
///     let calls = &AtomicU32::new(0);
///
///     let outcome = execute(&token, Config::from_millis(4, 1, 8), move || async move {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err("connection refused")
///         } else {
///             Ok("payload")
///         }
///     })
///     .await;
///
///     assert_eq!(outcome.attempts, 3);
///     assert_eq!(outcome.result, Ok("payload"));
/// }
/// ```
pub async fn execute<S, OP, F, R, O, E>(
    signal: &S,
    config: Config,
    mut operation: OP,
) -> Outcome<O, E>
where
    S: AsyncCancelSignal + ?Sized,
    OP: FnMut() -> F,
    F: Future<Output = R>,
    R: Into<Result<O, E>>,
{
    let config = config.normalize();
    let mut attempt = 0;

    loop {
        attempt += 1;

        if signal.is_triggered() {
            return Outcome::cancelled(signal, attempt - 1);
        }

        // Invoke the factory to obtain a new Future for this attempt.
        match operation().await.into() {
            Ok(value) => {
                tracing::debug!(attempt, "operation succeeded");
                return Outcome::success(attempt, value);
            }
            Err(err) => {
                if attempt == config.attempts {
                    tracing::debug!(attempt, "attempts exhausted");
                    return Outcome::exhausted(attempt, err);
                }

                let delay = strategy::delay(&config, attempt);
                tracing::debug!(attempt, ?delay, "attempt failed, backing off");
                if !delay.is_zero() && !sleep(signal, delay).await {
                    return Outcome::cancelled(signal, attempt);
                }
            }
        }
    }
}

/// Sleep for `duration` unless `signal` fires first.
///
/// Returns `true` if the full duration elapsed and `false` if the signal fired. The timer is
/// dropped as soon as either side finishes.
pub async fn sleep<S>(signal: &S, duration: Duration) -> bool
where
    S: AsyncCancelSignal + ?Sized,
{
    if duration.is_zero() {
        return true;
    }

    tracing::trace!(?duration, "waiting");
    tokio::select! {
        biased;
        _ = signal.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
