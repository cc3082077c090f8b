//! Configuration type definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::humanize::DelayRange;

/// Smallest accepted `interpolation.maximum_distance` (pixels)
pub const MIN_INTERPOLATION_DISTANCE: f64 = 1.0;

/// Smallest accepted `wind_mouse.step_size` (pixels)
pub const MIN_STEP_SIZE: f64 = 1.0;

fn check_delay_window(section: &str, min_ms: u64, max_ms: u64) -> Result<()> {
    if min_ms > max_ms {
        bail!(
            "{section}.minimum_delay_ms ({}) exceeds {section}.maximum_delay_ms ({})",
            min_ms,
            max_ms
        );
    }
    Ok(())
}

/// General pacing around every emitted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Shortest delay (ms)
    #[serde(default = "default_minimum_delay")]
    pub minimum_delay_ms: u64,

    /// Longest delay (ms)
    #[serde(default = "default_maximum_delay")]
    pub maximum_delay_ms: u64,

    /// Mean of the Gaussian distribution (ms)
    #[serde(default = "default_delay_mean")]
    pub delay_mean_ms: f64,

    /// Standard deviation of the Gaussian distribution (ms)
    #[serde(default = "default_delay_std_dev")]
    pub delay_std_dev_ms: f64,
}

fn default_minimum_delay() -> u64 {
    50
}
fn default_maximum_delay() -> u64 {
    150
}
fn default_delay_mean() -> f64 {
    100.0
}
fn default_delay_std_dev() -> f64 {
    50.0
}

impl DelayConfig {
    /// Distribution described by this section
    pub fn range(&self) -> DelayRange {
        DelayRange::new(
            self.minimum_delay_ms,
            self.maximum_delay_ms,
            self.delay_mean_ms,
            self.delay_std_dev_ms,
        )
    }

    /// Reject inverted bounds and non-finite distribution parameters
    pub fn validate(&self) -> Result<()> {
        check_delay_window("delay", self.minimum_delay_ms, self.maximum_delay_ms)?;
        if !self.delay_mean_ms.is_finite() {
            bail!("delay.delay_mean_ms must be finite");
        }
        if !self.delay_std_dev_ms.is_finite() || self.delay_std_dev_ms < 0.0 {
            bail!(
                "delay.delay_std_dev_ms must be a non-negative number, got {}",
                self.delay_std_dev_ms
            );
        }
        Ok(())
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            minimum_delay_ms: default_minimum_delay(),
            maximum_delay_ms: default_maximum_delay(),
            delay_mean_ms: default_delay_mean(),
            delay_std_dev_ms: default_delay_std_dev(),
        }
    }
}

/// Straight-line cursor movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Longest single cursor jump (pixels)
    #[serde(default = "default_interpolation_distance")]
    pub maximum_distance: f64,

    /// Shortest pause between steps (ms)
    #[serde(default)]
    pub minimum_delay_ms: u64,

    /// Longest pause between steps (ms)
    #[serde(default = "default_interpolation_max_delay")]
    pub maximum_delay_ms: u64,
}

fn default_interpolation_distance() -> f64 {
    2560.0
}
fn default_interpolation_max_delay() -> u64 {
    1000
}

impl InterpolationConfig {
    /// Per-step delay distribution
    pub fn step_delay(&self) -> DelayRange {
        DelayRange::from_bounds(self.minimum_delay_ms, self.maximum_delay_ms)
    }

    /// Reject step lengths below [`MIN_INTERPOLATION_DISTANCE`] and inverted delays
    pub fn validate(&self) -> Result<()> {
        if !self.maximum_distance.is_finite()
            || self.maximum_distance < MIN_INTERPOLATION_DISTANCE
        {
            bail!(
                "interpolation.maximum_distance must be at least {}, got {}",
                MIN_INTERPOLATION_DISTANCE,
                self.maximum_distance
            );
        }
        check_delay_window(
            "interpolation",
            self.minimum_delay_ms,
            self.maximum_delay_ms,
        )
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            maximum_distance: default_interpolation_distance(),
            minimum_delay_ms: 0,
            maximum_delay_ms: default_interpolation_max_delay(),
        }
    }
}

/// WindMouse cursor movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindMouseConfig {
    /// Use WindMouse instead of linear interpolation
    #[serde(default)]
    pub enabled: bool,

    /// Pull toward the target
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Random perturbation strength
    #[serde(default = "default_wind")]
    pub wind: f64,

    /// Shortest pause between ticks (ms)
    #[serde(default = "default_wind_min_delay")]
    pub minimum_delay_ms: u64,

    /// Longest pause between ticks (ms)
    #[serde(default = "default_wind_max_delay")]
    pub maximum_delay_ms: u64,

    /// Largest distance covered in one tick (pixels)
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Arrival radius around the target (pixels)
    #[serde(default = "default_target_area")]
    pub target_area: f64,
}

fn default_gravity() -> f64 {
    9.0
}
fn default_wind() -> f64 {
    3.0
}
fn default_wind_min_delay() -> u64 {
    2
}
fn default_wind_max_delay() -> u64 {
    10
}
fn default_step_size() -> f64 {
    15.0
}
fn default_target_area() -> f64 {
    12.0
}

impl WindMouseConfig {
    /// Per-tick delay distribution
    pub fn step_delay(&self) -> DelayRange {
        DelayRange::from_bounds(self.minimum_delay_ms, self.maximum_delay_ms)
    }

    /// Reject parameters that cannot converge on the target
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("gravity", self.gravity), ("target_area", self.target_area)] {
            if !value.is_finite() || value <= 0.0 {
                bail!("wind_mouse.{} must be positive, got {}", name, value);
            }
        }
        if !self.step_size.is_finite() || self.step_size < MIN_STEP_SIZE {
            bail!(
                "wind_mouse.step_size must be at least {}, got {}",
                MIN_STEP_SIZE,
                self.step_size
            );
        }
        if !self.wind.is_finite() || self.wind < 0.0 {
            bail!("wind_mouse.wind must be non-negative, got {}", self.wind);
        }
        check_delay_window("wind_mouse", self.minimum_delay_ms, self.maximum_delay_ms)
    }
}

impl Default for WindMouseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gravity: default_gravity(),
            wind: default_wind(),
            minimum_delay_ms: default_wind_min_delay(),
            maximum_delay_ms: default_wind_max_delay(),
            step_size: default_step_size(),
            target_area: default_target_area(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Narrate every action and lock grant at debug level
    #[serde(default)]
    pub debug: bool,
}
