//! Mouse Types
//!
//! Button identifiers and screen coordinates shared by the motion planner,
//! the session and the device backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::input::error::InputError;

/// Mouse button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button
    #[default]
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// Extra button 1 (side button)
    Extra1,
    /// Extra button 2 (side button)
    Extra2,
}

impl MouseButton {
    /// Convert to Linux button code
    pub fn to_linux_button(&self) -> u32 {
        match self {
            MouseButton::Left => 0x110,   // BTN_LEFT
            MouseButton::Right => 0x111,  // BTN_RIGHT
            MouseButton::Middle => 0x112, // BTN_MIDDLE
            MouseButton::Extra1 => 0x113, // BTN_SIDE
            MouseButton::Extra2 => 0x114, // BTN_EXTRA
        }
    }
}

impl FromStr for MouseButton {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(MouseButton::Left),
            "right" | "r" => Ok(MouseButton::Right),
            "middle" | "m" => Ok(MouseButton::Middle),
            "extra1" | "side" | "x1" => Ok(MouseButton::Extra1),
            "extra2" | "extra" | "x2" => Ok(MouseButton::Extra2),
            other => Err(InputError::InvalidMouseEvent(format!(
                "unknown button '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
            MouseButton::Extra1 => "extra1",
            MouseButton::Extra2 => "extra2",
        };
        f.write_str(name)
    }
}

/// Absolute cursor position in desktop pixels
///
/// Sub-pixel precision is kept so that planned paths stay smooth; backends
/// round when the platform needs integers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Both components are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Reject NaN/infinite coordinates before they reach a device
    pub fn validate(&self) -> Result<Self, InputError> {
        if self.is_finite() {
            Ok(*self)
        } else {
            Err(InputError::InvalidMouseEvent(format!(
                "non-finite coordinate {}",
                self
            )))
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self {
            x: x as f64,
            y: y as f64,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
