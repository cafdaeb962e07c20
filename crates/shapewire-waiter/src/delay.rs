//! The per-attempt backoff computation.

use std::time::Duration;

use rand::Rng;

use crate::error::WaiterError;

/// Outcome of [`compute_delay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayDecision {
    /// How long to sleep before the next attempt.
    pub delay: Duration,
    /// No attempt may follow the one after this delay.
    pub done: bool,
}

impl DelayDecision {
    const FINISHED: DelayDecision = DelayDecision {
        delay: Duration::ZERO,
        done: true,
    };
}

/// Computes the delay to wait after `attempt` (1-based) failed to reach the
/// target state.
///
/// The delay doubles from `min_delay` per attempt, is capped at `max_delay`,
/// and is fully jittered into `[min_delay, delay)` unless it equals
/// `min_delay`. When sleeping for it would leave no more than `min_delay` of
/// `remaining`, it is shortened to `remaining - min_delay` and `done` is set,
/// so the caller has room for exactly one final attempt.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256StarStar;
/// use shapewire_waiter::compute_delay;
///
/// let mut rng = Xoshiro256StarStar::seed_from_u64(7);
/// let secs = Duration::from_secs;
/// let decision = compute_delay(1, secs(2), secs(120), secs(300), &mut rng).unwrap();
/// assert_eq!(decision.delay, secs(2));
/// assert!(!decision.done);
/// ```
pub fn compute_delay<R: Rng + ?Sized>(
    attempt: u64,
    min_delay: Duration,
    max_delay: Duration,
    remaining: Duration,
    rng: &mut R,
) -> Result<DelayDecision, WaiterError> {
    if min_delay > max_delay {
        return Err(WaiterError::InvalidDelayRange {
            min: min_delay,
            max: max_delay,
        });
    }
    if attempt == 0 || remaining.is_zero() {
        return Ok(DelayDecision::FINISHED);
    }

    let mut delay = backoff(attempt, min_delay, max_delay);
    if delay != min_delay {
        delay = rng.gen_range(min_delay..delay);
    }

    if remaining.saturating_sub(delay) <= min_delay {
        return Ok(DelayDecision {
            delay: remaining.saturating_sub(min_delay),
            done: true,
        });
    }
    Ok(DelayDecision { delay, done: false })
}

/// `min(max, min * 2^(attempt - 1))` without overflowing for large attempts.
fn backoff(attempt: u64, min_delay: Duration, max_delay: Duration) -> Duration {
    let ceiling = (max_delay.as_secs_f64() / min_delay.as_secs_f64()).log2() + 1.0;
    if attempt as f64 > ceiling {
        return max_delay;
    }
    u32::try_from(attempt - 1)
        .ok()
        .and_then(|exp| 1u32.checked_shl(exp))
        .and_then(|factor| min_delay.checked_mul(factor))
        .map_or(max_delay, |delay| delay.min(max_delay))
}
