use std::time::Duration;

use rand::rngs::OsRng;
use rand::{TryCryptoRng, TryRngCore};

/// Draw a uniformly random duration in `[0, bound)` from the operating system's CSPRNG.
///
/// Returns [`Duration::ZERO`] if `bound` is zero or the random source fails.
pub fn jitter(bound: Duration) -> Duration {
    jitter_with(bound, &mut OsRng)
}

/// Draw a uniformly random duration in `[0, bound)` from `rng`.
///
/// A failing `rng` contributes no jitter. Bounds beyond `u64::MAX` nanoseconds are clamped.
pub fn jitter_with<R>(bound: Duration, rng: &mut R) -> Duration
where
    R: TryCryptoRng + ?Sized,
{
    let n = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    if n == 0 {
        return Duration::ZERO;
    }

    match below(n, rng) {
        Ok(nanos) => Duration::from_nanos(nanos),
        Err(err) => {
            tracing::trace!(error = %err, "jitter source failed, using no jitter");
            Duration::ZERO
        }
    }
}

// Rejection sampling: drop draws under 2^64 mod n so every residue is equally likely.
fn below<R>(n: u64, rng: &mut R) -> Result<u64, R::Error>
where
    R: TryRngCore + ?Sized,
{
    let threshold = n.wrapping_neg() % n;
    loop {
        let v = rng.try_next_u64()?;
        if v >= threshold {
            return Ok(v % n);
        }
    }
}
