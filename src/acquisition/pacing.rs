//! Humanized pacing policy for browser automation.
//!
//! Randomized waits between automation steps keep request timing from
//! looking machine-generated. Bounds live in one policy object so tests
//! can zero them out for determinism.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive min/max bounds for one pacing point, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayBounds {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    const fn zero() -> Self {
        Self::new(0, 0)
    }

    fn range(&self) -> RangeInclusive<u64> {
        self.min_ms..=self.max_ms.max(self.min_ms)
    }
}

/// Pacing bounds for every wait point in a browser acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Pause after navigation before inspecting the page.
    pub settle: DelayBounds,
    /// Pause between scroll increments.
    pub scroll_step: DelayBounds,
    /// Pause after scrolling completes.
    pub post_scroll: DelayBounds,
    /// Pause after expanding the collapsed about section.
    pub expand: DelayBounds,
    /// Backoff between retry attempts.
    pub retry_backoff: DelayBounds,
    /// Pixel range of one scroll increment.
    pub scroll_distance: DelayBounds,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            settle: DelayBounds::new(1000, 3000),
            scroll_step: DelayBounds::new(200, 400),
            post_scroll: DelayBounds::new(1500, 4000),
            expand: DelayBounds::new(800, 2000),
            retry_backoff: DelayBounds::new(3000, 5000),
            scroll_distance: DelayBounds::new(200, 400),
        }
    }
}

impl Pacing {
    /// All-zero pacing for deterministic tests.
    pub const fn none() -> Self {
        Self {
            settle: DelayBounds::zero(),
            scroll_step: DelayBounds::zero(),
            post_scroll: DelayBounds::zero(),
            expand: DelayBounds::zero(),
            retry_backoff: DelayBounds::zero(),
            scroll_distance: DelayBounds::zero(),
        }
    }

    /// Sleep for a randomized duration within the given bounds.
    pub async fn pause(&self, bounds: DelayBounds) {
        let ms = pick(bounds);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Randomized scroll increment in pixels.
    pub fn scroll_increment(&self) -> u64 {
        pick(self.scroll_distance).max(1)
    }
}

fn pick(bounds: DelayBounds) -> u64 {
    if bounds.min_ms == bounds.max_ms {
        return bounds.min_ms;
    }
    rand::thread_rng().gen_range(bounds.range())
}
