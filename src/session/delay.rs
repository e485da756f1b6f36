//! Randomized pause between telemetry frames

use std::time::Duration;

use rand::Rng;

use crate::config::StreamingConfig;

/// Smallest delay a session will ever sleep between frames
const MIN_DELAY_FLOOR_MS: u64 = 1;

/// Uniform delay drawn from an inclusive millisecond range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    min_ms: u64,
    max_ms: u64,
}

impl DelayPolicy {
    /// A zero minimum is raised to 1 ms and a maximum below the minimum
    /// collapses to the minimum.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let min_ms = min_ms.max(MIN_DELAY_FLOOR_MS);
        let max_ms = max_ms.max(min_ms);
        Self { min_ms, max_ms }
    }

    pub fn from_config(config: &StreamingConfig) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.random_range(self.min_ms..=self.max_ms))
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::from_config(&StreamingConfig::default())
    }
}
