//! Synchronous retry executor that blocks the calling thread between attempts.
use std::time::{Duration, Instant};

use crate::cancel::CancelSignal;
use crate::{Config, Outcome, strategy};

// Longest single wait when a duration cannot be expressed as an `Instant`.
const WAIT_CHUNK: Duration = Duration::from_secs(24 * 60 * 60);

/// Execute an operation and retry it with capped exponential backoff until it succeeds, the
/// attempts run out, or `signal` fires.
///
/// `config` is normalized first. Before every attempt the signal is checked; if it has fired the
/// sequence stops without invoking the operation again. After a failed attempt that is not the
/// last, the thread sleeps for [`strategy::delay`] or until the signal fires. An attempt that is
/// already running is never interrupted.
///
/// # Parameters
///
/// * `signal` - The cancellation signal to observe, e.g. a [`CancelToken`](crate::CancelToken)
///   or [`Never`](crate::Never).
/// * `config` - Retry tuning; unset fields take their defaults.
/// * `operation` - The operation to execute, typically a closure that returns a value convertible
///   to `Result`.
///
/// # Returns
///
/// An [`Outcome`] with the number of attempts made and either the operation's value, the last
/// operation error, or the cancellation reason. This function does not fail on its own.
///
/// # Examples
///
/// ```
/// use retryx::{Config, Never, sync::execute};
///
/// let mut calls = 0;
/// let outcome = execute(&Never, Config::from_millis(5, 1, 4), || {
///     calls += 1;
///     if calls < 3 { Err("not yet") } else { Ok(calls) }
/// });
///
/// assert_eq!(outcome.attempts, 3);
/// assert_eq!(outcome.result, Ok(3));
/// ```
///
/// Stopping early from another thread:
///
/// ```
/// use std::{thread, time::Duration};
/// use retryx::{CancelError, CancelToken, Config, Error, sync::execute};
///
/// let token = CancelToken::new();
/// let remote = token.clone();
/// thread::spawn(move || {
///     thread::sleep(Duration::from_millis(20));
///     remote.cancel();
/// });
///
/// let outcome = execute(&token, Config::from_millis(10, 10_000, 10_000), || {
///     Err::<(), _>("unavailable")
/// });
///
/// assert_eq!(outcome.attempts, 1);
/// assert_eq!(outcome.result, Err(Error::Cancelled(CancelError::Cancelled)));
/// ```
pub fn execute<S, OP, R, O, E>(signal: &S, config: Config, mut operation: OP) -> Outcome<O, E>
where
    S: CancelSignal + ?Sized,
    OP: FnMut() -> R,
    R: Into<Result<O, E>>,
{
    let config = config.normalize();
    let mut attempt = 0;

    loop {
        attempt += 1;

        if signal.is_triggered() {
            return Outcome::cancelled(signal, attempt - 1);
        }

        match operation().into() {
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
                if !delay.is_zero() && !sleep(signal, delay) {
                    return Outcome::cancelled(signal, attempt);
                }
            }
        }
    }
}

/// Sleep for `duration` unless `signal` fires first.
///
/// Returns `true` if the full duration elapsed and `false` if the signal fired. A zero duration
/// returns `true` at once.
pub fn sleep<S>(signal: &S, duration: Duration) -> bool
where
    S: CancelSignal + ?Sized,
{
    if duration.is_zero() {
        return true;
    }

    tracing::trace!(?duration, "waiting");
    match Instant::now().checked_add(duration) {
        Some(deadline) => !signal.wait_until_triggered_or(deadline),
        None => loop {
            if signal.wait_until_triggered_or(Instant::now() + WAIT_CHUNK) {
                return false;
            }
        },
    }
}
