//! # Retryx
//!
//! A bounded retry executor for operations that may fail.
//!
//! `retryx` invokes an operation until it succeeds, a configured number of attempts is used up,
//! or an external cancellation signal fires. Between attempts it waits for a capped exponential
//! backoff, optionally with random jitter drawn from the operating system's CSPRNG. The waits
//! are cut short as soon as the signal fires.
//!
//! ## Features
//!
//! - Blocking retries through the `sync` module
//! - Asynchronous retries on tokio through the `unsync` module
//! - Cooperative cancellation through the [`CancelSignal`] trait, with [`CancelToken`] and
//!   [`Never`] provided
//! - Every outcome, including cancellation, reported through the returned [`Outcome`]
//!
//! ## Usage Examples
//!
//! ### Synchronous Usage
//!
//! ```rust
//! use retryx::{Config, Never, sync::execute};
//!
//! let outcome = execute(&Never, Config::default(), || {
//!     // Your fallible operation here
//!     if some_condition() {
//!         Ok("success")
//!     } else {
//!         Err("failure")
//!     }
//! });
//!
//! assert_eq!(outcome.attempts, 1);
//! # fn some_condition() -> bool { true }
//! ```
//!
//! ### Asynchronous Usage
//!
//! ```rust
//! use std::time::Duration;
//! use retryx::{CancelToken, Config, unsync::execute};
//!
//! async fn example(token: CancelToken) -> Result<&'static str, retryx::Error<&'static str>> {
//!     let config = Config::default().with_jitter(Duration::from_millis(50));
//!     execute(&token, config, || async { Ok::<_, &str>("Success") })
//!         .await
//!         .into_result()
//! }
//! ```
pub mod cancel;
mod config;
mod error;
mod outcome;
pub mod strategy;
pub mod sync;
pub mod unsync;

pub use cancel::{AsyncCancelSignal, CancelError, CancelSignal, CancelToken, Never};
pub use config::{Config, DEFAULT_ATTEMPTS, DEFAULT_BASE, DEFAULT_MAX};
pub use error::Error;
pub use outcome::Outcome;
