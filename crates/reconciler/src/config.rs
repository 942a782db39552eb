//! Reconciler configuration.
//!
//! Passed explicitly to each [`Reconciler`](crate::Reconciler). Durations
//! serialize as fractional seconds so the TOML form stays readable:
//!
//! ```toml
//! [create]
//! max_duration = 30.0
//!
//! [wait]
//! timeout = 1800.0
//! poll_interval = 3.0
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry envelope settings for one lifecycle verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total time budget across all attempts
    #[serde(with = "secs")]
    pub max_duration: Duration,
    /// Delay before the first retry
    #[serde(with = "secs")]
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    #[serde(with = "secs")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(30),
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    pub fn new(max_duration: Duration) -> Self {
        Self {
            max_duration,
            ..Default::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// A config that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_duration: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// Operation waiter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Total wall-clock budget for one wait
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Interval between status polls
    #[serde(with = "secs")]
    pub poll_interval: Duration,
    /// Growth factor for the poll interval; 1.0 polls at a constant rate
    pub backoff_factor: f64,
    /// Upper bound for the poll interval when backing off
    #[serde(with = "secs")]
    pub max_poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_secs(3),
            backoff_factor: 1.0,
            max_poll_interval: Duration::from_secs(30),
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
            ..Default::default()
        }
    }

    /// Interval to sleep after the given poll (0-indexed).
    pub fn interval_for_poll(&self, poll: u32) -> Duration {
        if self.backoff_factor <= 1.0 {
            return self.poll_interval;
        }
        let interval = self.poll_interval.as_secs_f64() * self.backoff_factor.powi(poll as i32);
        let cap = self
            .max_poll_interval
            .max(self.poll_interval)
            .as_secs_f64();
        Duration::from_secs_f64(interval.min(cap))
    }
}

/// Everything a reconciler needs to know about timing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub create: RetryConfig,
    pub update: RetryConfig,
    pub delete: RetryConfig,
    pub wait: WaitConfig,
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_for_attempt() {
        let config = RetryConfig {
            max_duration: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(5),
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(5));
    }

    #[test]
    fn test_constant_poll_interval() {
        let config = WaitConfig::default();
        assert_eq!(config.interval_for_poll(0), Duration::from_secs(3));
        assert_eq!(config.interval_for_poll(10), Duration::from_secs(3));
    }

    #[test]
    fn test_backoff_poll_interval_is_capped() {
        let config = WaitConfig {
            backoff_factor: 2.0,
            max_poll_interval: Duration::from_secs(10),
            ..WaitConfig::new(Duration::from_secs(60), Duration::from_secs(3))
        };
        assert_eq!(config.interval_for_poll(0), Duration::from_secs(3));
        assert_eq!(config.interval_for_poll(1), Duration::from_secs(6));
        assert_eq!(config.interval_for_poll(2), Duration::from_secs(10));
    }

    #[test]
    fn test_json_uses_seconds() {
        let config: ReconcilerConfig =
            serde_json::from_str(r#"{"create": {"max_duration": 120.0}, "wait": {"poll_interval": 0.5}}"#)
                .unwrap();
        assert_eq!(config.create.max_duration, Duration::from_secs(120));
        assert_eq!(config.create.backoff_factor, 2.0);
        assert_eq!(config.wait.poll_interval, Duration::from_millis(500));
        assert_eq!(config.wait.timeout, Duration::from_secs(1800));
        assert_eq!(config.delete, RetryConfig::default());
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let result: Result<WaitConfig, _> = serde_json::from_str(r#"{"timeout": -1.0}"#);
        assert!(result.is_err());
    }
}
