use std::convert::Infallible;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`compute_delay`](crate::compute_delay) and
/// [`Waiter::wait`](crate::Waiter::wait).
///
/// `E` is the error type of the waited-on operation; the pure delay function
/// never produces [`WaiterError::Operation`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaiterError<E = Infallible> {
    #[error("minimum delay {min:?} is greater than maximum delay {max:?}")]
    InvalidDelayRange { min: Duration, max: Duration },
    #[error("waiter cancelled")]
    Cancelled,
    #[error("exceeded max wait time after {attempts} attempts")]
    TimedOut { attempts: u64 },
    #[error("waiter operation failed: {0}")]
    Operation(#[source] E),
}

impl WaiterError {
    pub(crate) fn widen<E>(self) -> WaiterError<E> {
        match self {
            WaiterError::InvalidDelayRange { min, max } => WaiterError::InvalidDelayRange { min, max },
            WaiterError::Cancelled => WaiterError::Cancelled,
            WaiterError::TimedOut { attempts } => WaiterError::TimedOut { attempts },
            WaiterError::Operation(never) => match never {},
        }
    }
}
