//! Linear Interpolation
//!
//! Splits a move into the fewest equal straight-line steps such that no
//! step is longer than the configured maximum distance.

use tracing::{trace, warn};

use crate::config::InterpolationConfig;
use crate::humanize::DelayRange;
use crate::input::mouse::Point;

/// Most steps a single linear move is split into
pub const MAX_STEPS: usize = 100_000;

/// Straight-line path planner
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolation {
    max_step_distance: f64,
    step_delay: DelayRange,
}

impl LinearInterpolation {
    /// Create a planner
    pub fn new(max_step_distance: f64, step_delay: DelayRange) -> Self {
        Self {
            max_step_distance,
            step_delay,
        }
    }

    /// Planner for an interpolation config section
    pub fn from_config(config: &InterpolationConfig) -> Self {
        Self::new(config.maximum_distance, config.step_delay())
    }

    /// Pause between steps
    pub fn step_delay(&self) -> DelayRange {
        self.step_delay
    }

    /// `ceil(distance / max_step_distance)`, clamped to `1..=MAX_STEPS`
    ///
    /// Longer moves than `MAX_STEPS` steps allow are spread over `MAX_STEPS`
    /// equal steps, each longer than the configured maximum.
    pub fn step_count(&self, from: Point, to: Point) -> usize {
        let distance = from.distance_to(to);
        if self.max_step_distance.is_nan() || self.max_step_distance <= 0.0 || !distance.is_finite()
        {
            return 1;
        }
        let steps = (distance / self.max_step_distance).ceil();
        if steps > MAX_STEPS as f64 {
            warn!(
                "Linear move of {:.1}px needs {} steps of {}px, capping at {}",
                distance, steps, self.max_step_distance, MAX_STEPS
            );
            return MAX_STEPS;
        }
        (steps as usize).max(1)
    }

    /// Intermediate cursor targets, ending exactly on `to`
    pub fn plan(&self, from: Point, to: Point) -> Vec<Point> {
        let steps = self.step_count(from, to);
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        trace!("Linear path {} -> {} in {} steps", from, to, steps);

        (1..=steps)
            .map(|i| {
                if i == steps {
                    to
                } else {
                    let (i, n) = (i as f64, steps as f64);
                    Point::new(from.x + dx * i / n, from.y + dy * i / n)
                }
            })
            .collect()
    }
}
