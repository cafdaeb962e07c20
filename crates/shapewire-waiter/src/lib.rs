//! `shapewire-waiter`: backoff for long-running-operation waiters.
//!
//! [`compute_delay`] is the pure per-attempt computation (exponential backoff
//! with full jitter and a deadline clamp); [`Waiter`] drives it in an async
//! polling loop whose sleeps can be cancelled.

mod delay;
mod error;
mod options;
mod waiter;

pub use delay::{compute_delay, DelayDecision};
pub use error::WaiterError;
pub use options::WaiterOptions;
pub use waiter::Waiter;
