//! Cursor Motion Planning
//!
//! Two interchangeable strategies turn "move from A to B" into a sequence of
//! intermediate cursor targets:
//!
//! - [`LinearInterpolation`]: fewest equal straight steps under a maximum
//!   step length
//! - [`WindMouse`]: gravity + wind particle simulation
//!
//! Planning is pure; the session emits each point and sleeps a sampled
//! per-step delay in between, which is where cancellation is observed. Both
//! strategies end on the exact requested coordinate.

pub mod linear;
pub mod wind_mouse;

pub use linear::LinearInterpolation;
pub use wind_mouse::WindMouse;

use rand::Rng;

use crate::config::HumanizerConfig;
use crate::humanize::DelayRange;
use crate::input::mouse::Point;

/// Selected movement strategy
#[derive(Debug, Clone, PartialEq)]
pub enum MotionPlanner {
    /// Straight-line steps
    Linear(LinearInterpolation),
    /// Curved, wind-perturbed path
    WindMouse(WindMouse),
}

impl MotionPlanner {
    /// Strategy selected by `wind_mouse.enabled`
    pub fn from_config(config: &HumanizerConfig) -> Self {
        if config.wind_mouse.enabled {
            MotionPlanner::WindMouse(WindMouse::from_config(&config.wind_mouse))
        } else {
            MotionPlanner::Linear(LinearInterpolation::from_config(&config.interpolation))
        }
    }

    /// Strategy name for logs
    pub fn name(&self) -> &'static str {
        match self {
            MotionPlanner::Linear(_) => "linear",
            MotionPlanner::WindMouse(_) => "windmouse",
        }
    }

    /// Pause between emitted points
    pub fn step_delay(&self) -> DelayRange {
        match self {
            MotionPlanner::Linear(linear) => linear.step_delay(),
            MotionPlanner::WindMouse(wind) => wind.step_delay(),
        }
    }

    /// Points to emit, in order; the last one is exactly `to`
    pub fn plan<R: Rng + ?Sized>(&self, from: Point, to: Point, rng: &mut R) -> Vec<Point> {
        match self {
            MotionPlanner::Linear(linear) => linear.plan(from, to),
            MotionPlanner::WindMouse(wind) => wind.plan(from, to, rng),
        }
    }
}

impl From<LinearInterpolation> for MotionPlanner {
    fn from(planner: LinearInterpolation) -> Self {
        MotionPlanner::Linear(planner)
    }
}

impl From<WindMouse> for MotionPlanner {
    fn from(planner: WindMouse) -> Self {
        MotionPlanner::WindMouse(planner)
    }
}
