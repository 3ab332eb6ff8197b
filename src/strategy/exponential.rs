use std::time::Duration;

use crate::Config;

/// Each retry doubles the delay since the last, until it reaches a ceiling.
///
/// The first item is the initial delay. Once doubling would reach or exceed the ceiling (or
/// overflow), the ceiling is yielded from then on.
#[derive(Debug, Clone)]
pub struct Exponential {
    current: Duration,
    max: Duration,
}

impl Exponential {
    /// Create a new [`Exponential`] starting at `base` and capped at `max`.
    ///
    /// A `base` above `max` is capped immediately.
    pub fn new(base: Duration, max: Duration) -> Self {
        Exponential {
            current: base.min(max),
            max,
        }
    }

    /// Create a new [`Exponential`] using millisecond durations.
    pub fn from_millis(base: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(base), Duration::from_millis(max))
    }
}

impl Iterator for Exponential {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let duration = self.current;

        self.current = match self.current.checked_mul(2) {
            Some(next) if next < self.max => next,
            _ => self.max,
        };

        Some(duration)
    }
}

impl From<&Config> for Exponential {
    fn from(config: &Config) -> Self {
        Self::new(config.base, config.max)
    }
}

#[test]
fn exponential_doubles_until_cap() {
    let mut iter = Exponential::from_millis(100, 1000);
    assert_eq!(iter.next(), Some(Duration::from_millis(100)));
    assert_eq!(iter.next(), Some(Duration::from_millis(200)));
    assert_eq!(iter.next(), Some(Duration::from_millis(400)));
    assert_eq!(iter.next(), Some(Duration::from_millis(800)));
    assert_eq!(iter.next(), Some(Duration::from_millis(1000)));
    assert_eq!(iter.next(), Some(Duration::from_millis(1000)));
}

#[test]
fn exponential_caps_on_exact_hit() {
    let mut iter = Exponential::from_millis(1, 2);
    assert_eq!(iter.next(), Some(Duration::from_millis(1)));
    assert_eq!(iter.next(), Some(Duration::from_millis(2)));
    assert_eq!(iter.next(), Some(Duration::from_millis(2)));
}

#[test]
fn exponential_overflow() {
    let mut iter = Exponential::new(Duration::MAX, Duration::MAX);
    assert_eq!(iter.next(), Some(Duration::MAX));
    assert_eq!(iter.next(), Some(Duration::MAX));
}
