//! Retry tuning parameters.
use std::time::Duration;

/// Number of attempts used when [`Config::attempts`] is unset.
pub const DEFAULT_ATTEMPTS: u32 = 3;
/// Initial backoff used when [`Config::base`] is unset.
pub const DEFAULT_BASE: Duration = Duration::from_millis(200);
/// Backoff ceiling used when [`Config::max`] is unset.
pub const DEFAULT_MAX: Duration = Duration::from_secs(2);

/// Controls how many times an operation is attempted and how long to wait in between.
///
/// Every field is plain data. A zero value means "unset" and is replaced with its default by
/// [`Config::normalize`], which the executors call before using the configuration.
///
/// ```
/// use std::time::Duration;
/// use retryx::Config;
///
/// let config = Config::default()
///     .with_attempts(5)
///     .with_jitter(Duration::from_millis(50));
///
/// assert_eq!(config.attempts, 5);
/// assert_eq!(config.base, Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Maximum number of times the operation is invoked.
    pub attempts: u32,
    /// Delay after the first failed attempt.
    pub base: Duration,
    /// Ceiling on the exponential part of the delay.
    pub max: Duration,
    /// Exclusive upper bound of the random delay added on top of the backoff. Zero disables it.
    pub jitter: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            attempts: DEFAULT_ATTEMPTS,
            base: DEFAULT_BASE,
            max: DEFAULT_MAX,
            jitter: Duration::ZERO,
        }
    }
}

impl Config {
    /// Create a new [`Config`] from millisecond values, without jitter.
    pub fn from_millis(attempts: u32, base: u64, max: u64) -> Self {
        Config {
            attempts,
            base: Duration::from_millis(base),
            max: Duration::from_millis(max),
            jitter: Duration::ZERO,
        }
    }

    /// Set the maximum number of attempts.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the delay after the first failed attempt.
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Set the ceiling on the exponential delay.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Set the exclusive upper bound of the random delay.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace unset fields with their defaults.
    ///
    /// Each field is checked on its own: zero `attempts`, `base` or `max` take
    /// [`DEFAULT_ATTEMPTS`], [`DEFAULT_BASE`] and [`DEFAULT_MAX`]. Afterwards `max` is raised to
    /// `base` if it is smaller. `jitter` is kept as given.
    ///
    /// The result always satisfies `attempts >= 1`, `base > 0` and `max >= base`, and
    /// normalizing it again returns it unchanged.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.attempts == 0 {
            self.attempts = DEFAULT_ATTEMPTS;
        }
        if self.base.is_zero() {
            self.base = DEFAULT_BASE;
        }
        if self.max.is_zero() {
            self.max = DEFAULT_MAX;
        }
        if self.max < self.base {
            self.max = self.base;
        }
        self
    }
}
