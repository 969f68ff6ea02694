use crate::TargetingError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_DISTANCE_M: f64 = 10_000.0;
pub const DEFAULT_STEP_DISTANCE_M: f64 = 50.0;
pub const DEFAULT_ELEVATION_THRESHOLD_M: f64 = 50.0;

/// Most probes a single search may make.
pub const MAX_STEP_COUNT: u32 = 1_000_000;

/// Slack when counting how many steps fit in the max distance, so
/// that e.g. 0.3 / 0.1 counts three steps rather than two.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Parameters of an elevation search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Farthest distance searched (meters).
    pub max_distance_m: f64,

    /// Distance between successive probes (meters).
    pub step_distance_m: f64,

    /// A probe qualifies when its elevation differs from the origin's
    /// by strictly more than this (meters).
    pub elevation_threshold_m: f64,

    /// Wall-clock budget for the whole search, if any.
    pub time_budget: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            step_distance_m: DEFAULT_STEP_DISTANCE_M,
            elevation_threshold_m: DEFAULT_ELEVATION_THRESHOLD_M,
            time_budget: None,
        }
    }
}

impl SearchConfig {
    pub fn new(
        max_distance_m: f64,
        step_distance_m: f64,
        elevation_threshold_m: f64,
    ) -> Result<Self, TargetingError> {
        let config = Self {
            max_distance_m,
            step_distance_m,
            elevation_threshold_m,
            time_budget: None,
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Checks `0 < step_distance_m <= max_distance_m`, that no more
    /// than [MAX_STEP_COUNT] steps fit, and that the threshold is a
    /// non-negative number.
    pub fn validate(&self) -> Result<(), TargetingError> {
        if !(self.step_distance_m > 0.0 && self.step_distance_m.is_finite()) {
            return Err(TargetingError::InvalidConfig("step distance must be positive"));
        }
        if !(self.max_distance_m >= self.step_distance_m && self.max_distance_m.is_finite()) {
            return Err(TargetingError::InvalidConfig(
                "max distance must be at least the step distance",
            ));
        }
        if self.max_distance_m / self.step_distance_m > f64::from(MAX_STEP_COUNT) {
            return Err(TargetingError::InvalidConfig(
                "max distance allows too many steps",
            ));
        }
        if !(self.elevation_threshold_m >= 0.0 && self.elevation_threshold_m.is_finite()) {
            return Err(TargetingError::InvalidConfig(
                "elevation threshold must be non-negative",
            ));
        }
        Ok(())
    }

    /// Number of probes a full search makes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn step_count(&self) -> usize {
        (self.max_distance_m / self.step_distance_m + STEP_COUNT_SLACK).floor() as usize
    }

    /// Probe distances in increasing order.
    ///
    /// Each is an integer multiple of the step so error does not
    /// accumulate; the last one is exactly `max_distance_m` whenever
    /// the step divides it.
    #[allow(clippy::cast_precision_loss)]
    pub fn step_distances(&self) -> impl Iterator<Item = f64> {
        let Self {
            max_distance_m,
            step_distance_m,
            ..
        } = *self;
        (1..=self.step_count()).map(move |i| (i as f64 * step_distance_m).min(max_distance_m))
    }
}
