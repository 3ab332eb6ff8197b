//! Backoff delays between attempts.

use std::time::Duration;

use rand::TryCryptoRng;
use rand::rngs::OsRng;

use crate::Config;

/// Capped exponential delays.
pub mod exponential;
pub use exponential::Exponential;

mod random;
pub use random::{jitter, jitter_with};

/// Delay to wait after the 1-based `attempt` failed, before the next one starts.
///
/// The exponential part is `config.base` doubled `attempt - 1` times and capped at `config.max`.
/// When `config.jitter` is non-zero a random duration below it, drawn from the OS CSPRNG, is added
/// on top; that sum is not capped again. `config` is expected to be normalized.
///
/// ```
/// use std::time::Duration;
/// use retryx::Config;
/// use retryx::strategy::delay;
///
/// let config = Config::from_millis(5, 100, 300);
/// assert_eq!(delay(&config, 1), Duration::from_millis(100));
/// assert_eq!(delay(&config, 2), Duration::from_millis(200));
/// assert_eq!(delay(&config, 3), Duration::from_millis(300));
/// ```
pub fn delay(config: &Config, attempt: u32) -> Duration {
    delay_with(config, attempt, &mut OsRng)
}

/// Like [`delay`], drawing jitter from `rng`.
pub fn delay_with<R>(config: &Config, attempt: u32, rng: &mut R) -> Duration
where
    R: TryCryptoRng + ?Sized,
{
    // Doubling from 1ns reaches Duration::MAX in under 128 steps; the cap holds after that.
    let steps = attempt.saturating_sub(1).min(128) as usize;
    let backoff = Exponential::from(config)
        .nth(steps)
        .unwrap_or(config.max);

    if config.jitter.is_zero() {
        backoff
    } else {
        backoff.saturating_add(jitter_with(config.jitter, rng))
    }
}
