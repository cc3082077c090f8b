//! Human-like timing
//!
//! - [`delay`]: bounded-Gaussian delay sampling and the cancellable wait
//!   primitive
//! - [`key_hold`]: minimum hold time bookkeeping for pressed keys

pub mod delay;
pub mod key_hold;

pub use delay::{wait, DelayGenerator, DelayRange};
pub use key_hold::KeyHoldTracker;
