//! Delay jitter and retry policies for interactive page actions

use crate::config::CollectorConfig;
use crate::error::JobScoutError;
use rand::Rng;
use std::time::Duration;

/// Bounded random delay. The lower bound is never below one millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

const MIN_DELAY: Duration = Duration::from_millis(1);

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.max(MIN_DELAY);
        Self { min, max: max.max(min) }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// Smallest allowed range, for tests
    pub fn instant() -> Self {
        Self::new(MIN_DELAY, MIN_DELAY)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }

    pub async fn pause(&self) {
        tokio::time::sleep(self.sample()).await;
    }
}

/// How often and how patiently a failed navigation is retried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: DelayRange,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: DelayRange) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Attempts and backoff window from the `[collector]` section
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(
            config.retry_attempts,
            DelayRange::from_millis(config.backoff_min_ms, config.backoff_max_ms),
        )
    }

    pub fn no_retry() -> Self {
        Self::new(1, DelayRange::instant())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether attempt number `attempt` (1-based) that failed with `err` gets another go
    pub fn should_retry(&self, attempt: u32, err: &JobScoutError) -> bool {
        attempt < self.max_attempts && err.is_transient()
    }

    pub async fn backoff(&self) {
        self.backoff.pause().await;
    }
}
