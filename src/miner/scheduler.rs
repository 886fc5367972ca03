//! Request pacing
//!
//! Every outbound request after the first one in a run waits a random delay
//! drawn uniformly from a configured window. Requests never overlap with the
//! wait: the miner is strictly sequential.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized delay between consecutive requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    /// Creates a pacer drawing delays from `[min_ms, max_ms]`
    ///
    /// A reversed window is swapped rather than rejected.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let (lo, hi) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            min: Duration::from_millis(lo),
            max: Duration::from_millis(hi),
        }
    }

    /// Pacing between result pages of a listing run
    pub fn for_listing(config: &PacingConfig) -> Self {
        Self::new(config.list_min_delay_ms, config.list_max_delay_ms)
    }

    /// Pacing between detail pages
    pub fn for_details(config: &PacingConfig) -> Self {
        Self::new(config.detail_min_delay_ms, config.detail_max_delay_ms)
    }

    /// Draws the next delay
    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    /// Sleeps for a freshly drawn delay and returns it
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
