//! WindMouse
//!
//! Physics-flavoured cursor paths: a particle is pulled toward the target by
//! gravity and pushed around by a random wind, producing the slightly curved,
//! uneven strokes of a real hand.
//!
//! # Model
//!
//! ```text
//! each tick:
//!   far from target:  wind = wind/√3 + U(-1,1)·min(W, dist)/√5
//!   near target:      wind = wind/√3, max_step shrinks (÷√5, then 3..6)
//!   velocity += wind + G·(target - pos)/dist
//!   |velocity| capped to U(step/2, step) where step = min(max_step, dist)
//!   pos += velocity
//! until dist <= target_area, then snap to target
//! ```
//!
//! Capping every tick to the remaining distance keeps the particle from
//! orbiting the target; a hard tick ceiling backs that up. A position that
//! stops being finite ends the simulation without being emitted.

use rand::Rng;
use tracing::{trace, warn};

use crate::config::WindMouseConfig;
use crate::humanize::DelayRange;
use crate::input::mouse::Point;

/// Ticks after which a path is abandoned and snapped to the target
pub const MAX_TICKS: usize = 10_000;

/// WindMouse path planner
#[derive(Debug, Clone, PartialEq)]
pub struct WindMouse {
    gravity: f64,
    wind: f64,
    step_size: f64,
    target_area: f64,
    step_delay: DelayRange,
}

impl WindMouse {
    /// Create a planner
    pub fn new(
        gravity: f64,
        wind: f64,
        step_size: f64,
        target_area: f64,
        step_delay: DelayRange,
    ) -> Self {
        Self {
            gravity,
            wind,
            step_size,
            target_area,
            step_delay,
        }
    }

    /// Planner for a WindMouse config section
    pub fn from_config(config: &WindMouseConfig) -> Self {
        Self::new(
            config.gravity,
            config.wind,
            config.step_size,
            config.target_area,
            config.step_delay(),
        )
    }

    /// Pause between ticks
    pub fn step_delay(&self) -> DelayRange {
        self.step_delay
    }

    /// Arrival radius
    pub fn target_area(&self) -> f64 {
        self.target_area
    }

    /// Per-tick distance cap
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Simulate the particle and return every emitted position
    ///
    /// The last element is always exactly `to`; the one before it (if any)
    /// lies within `target_area` of `to`.
    pub fn plan<R: Rng + ?Sized>(&self, from: Point, to: Point, rng: &mut R) -> Vec<Point> {
        let sqrt3 = 3f64.sqrt();
        let sqrt5 = 5f64.sqrt();
        let damping_distance = self.target_area + self.step_size;

        let mut path = Vec::new();
        let mut pos = from;
        let (mut vx, mut vy) = (0.0f64, 0.0f64);
        let (mut wx, mut wy) = (0.0f64, 0.0f64);
        let mut max_step = self.step_size;

        let mut ticks = 0;
        loop {
            let dist = pos.distance_to(to);
            if dist <= self.target_area || dist.is_nan() {
                break;
            }
            if ticks == MAX_TICKS {
                warn!(
                    "WindMouse gave up after {} ticks at {} (target {}), snapping",
                    MAX_TICKS, pos, to
                );
                break;
            }
            ticks += 1;

            let wind_mag = self.wind.min(dist);
            if dist >= damping_distance {
                wx = wx / sqrt3 + (2.0 * rng.random::<f64>() - 1.0) * wind_mag / sqrt5;
                wy = wy / sqrt3 + (2.0 * rng.random::<f64>() - 1.0) * wind_mag / sqrt5;
            } else {
                wx /= sqrt3;
                wy /= sqrt3;
                max_step = if max_step < 3.0 {
                    rng.random::<f64>() * 3.0 + 3.0
                } else {
                    max_step / sqrt5
                };
                max_step = max_step.min(self.step_size);
            }

            vx += wx + self.gravity * (to.x - pos.x) / dist;
            vy += wy + self.gravity * (to.y - pos.y) / dist;

            let limit = max_step.min(dist);
            let v_mag = vx.hypot(vy);
            if v_mag > limit {
                let v_clip = limit / 2.0 + rng.random::<f64>() * limit / 2.0;
                vx = vx / v_mag * v_clip;
                vy = vy / v_mag * v_clip;
            }

            let next = Point::new(pos.x + vx, pos.y + vy);
            if !next.is_finite() {
                warn!(
                    "WindMouse left finite space after {} ticks at {}, snapping to {}",
                    ticks, pos, to
                );
                break;
            }
            pos = next;
            path.push(pos);
        }

        trace!(
            "WindMouse path {} -> {}: {} ticks before snap",
            from,
            to,
            ticks
        );

        path.push(to);
        path
    }
}
