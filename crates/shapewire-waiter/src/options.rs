use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WaiterError;

/// Timing configuration of a [`Waiter`](crate::Waiter).
///
/// ```
/// use std::time::Duration;
/// use shapewire_waiter::WaiterOptions;
///
/// let options = WaiterOptions::default()
///     .min_delay(Duration::from_secs(5))
///     .max_wait(Duration::from_secs(60));
/// assert_eq!(options.max_delay, Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaiterOptions {
    /// Floor of every delay and the slack kept for the final attempt.
    pub min_delay: Duration,
    /// Cap of the exponential backoff.
    pub max_delay: Duration,
    /// Overall budget across all attempts.
    pub max_wait: Duration,
}

impl Default for WaiterOptions {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(120),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl WaiterOptions {
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    pub fn validate(&self) -> Result<(), WaiterError> {
        if self.min_delay > self.max_delay {
            return Err(WaiterError::InvalidDelayRange {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = WaiterOptions::default();
        assert_eq!(options.min_delay, Duration::from_secs(2));
        assert_eq!(options.max_delay, Duration::from_secs(120));
        assert_eq!(options.max_wait, Duration::from_secs(300));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let options: WaiterOptions =
            serde_json::from_str(r#"{"max_wait":{"secs":30,"nanos":0}}"#).unwrap();
        assert_eq!(options, WaiterOptions::default().max_wait(Duration::from_secs(30)));
    }

    #[test]
    fn inverted_range_fails_validation() {
        let options = WaiterOptions::default().min_delay(Duration::from_secs(500));
        assert!(matches!(
            options.validate(),
            Err(WaiterError::InvalidDelayRange { .. })
        ));
    }
}
