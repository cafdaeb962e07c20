use std::future::Future;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tokio::time::Instant;
use tracing::debug;

use crate::delay::compute_delay;
use crate::error::WaiterError;
use crate::options::WaiterOptions;

/// Polls an operation until it reports a result, backing off between
/// attempts with [`compute_delay`].
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// use std::future::{pending, ready};
/// use shapewire_waiter::{Waiter, WaiterOptions};
///
/// let mut waiter = Waiter::with_seed(WaiterOptions::default(), 1);
/// let out = waiter
///     .wait(
///         |attempt| ready(Ok::<_, std::io::Error>((attempt == 3).then_some("ready"))),
///         pending(),
///     )
///     .await;
/// assert_eq!(out.unwrap(), "ready");
/// # }
/// ```
#[derive(Debug)]
pub struct Waiter<R = Xoshiro256StarStar> {
    options: WaiterOptions,
    rng: R,
}

impl Waiter {
    /// Jitter seeded from system entropy.
    pub fn new(options: WaiterOptions) -> Self {
        Self::with_rng(options, Xoshiro256StarStar::from_entropy())
    }

    pub fn with_seed(options: WaiterOptions, seed: u64) -> Self {
        Self::with_rng(options, Xoshiro256StarStar::seed_from_u64(seed))
    }
}

impl<R: Rng> Waiter<R> {
    pub fn with_rng(options: WaiterOptions, rng: R) -> Self {
        Self { options, rng }
    }

    pub fn options(&self) -> &WaiterOptions {
        &self.options
    }

    /// Calls `operation` with the 1-based attempt number until it yields
    /// `Some`, fails, runs out of `max_wait`, or `cancel` completes.
    ///
    /// Sleeps race `cancel`; once the delay budget is exhausted exactly one
    /// more attempt runs before [`WaiterError::TimedOut`].
    pub async fn wait<T, E, F, Fut, C>(
        &mut self,
        mut operation: F,
        cancel: C,
    ) -> Result<T, WaiterError<E>>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        C: Future<Output = ()>,
    {
        self.options.validate().map_err(|err| err.widen::<E>())?;
        let WaiterOptions {
            min_delay,
            max_delay,
            max_wait,
        } = self.options;
        let start = Instant::now();
        tokio::pin!(cancel);

        let mut attempt = 0u64;
        loop {
            attempt += 1;
            if let Some(out) = operation(attempt).await.map_err(WaiterError::Operation)? {
                return Ok(out);
            }

            let remaining = max_wait.saturating_sub(start.elapsed());
            let decision = compute_delay(attempt, min_delay, max_delay, remaining, &mut self.rng)
                .map_err(|err| err.widen::<E>())?;
            debug!(
                attempt,
                delay = ?decision.delay,
                remaining = ?remaining,
                done = decision.done,
                "retrying after delay"
            );

            tokio::select! {
                biased;
                _ = &mut cancel => {
                    debug!(attempt, "waiter cancelled");
                    return Err(WaiterError::Cancelled);
                }
                _ = tokio::time::sleep(decision.delay) => {}
            }

            if decision.done {
                attempt += 1;
                if let Some(out) = operation(attempt).await.map_err(WaiterError::Operation)? {
                    return Ok(out);
                }
                debug!(attempt, elapsed = ?start.elapsed(), "waiter timed out");
                return Err(WaiterError::TimedOut { attempts: attempt });
            }
        }
    }
}
