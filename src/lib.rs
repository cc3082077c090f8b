//! # input-humanizer
//!
//! Exclusive, human-like mouse and keyboard input for automation clients.
//!
//! Several independent clients may want to drive the same input device. This
//! crate serialises them behind a single lock and paces every action with
//! randomized delays, hold times, and curved cursor paths so the resulting
//! event stream resembles a person at the controls.
//!
//! # Architecture
//!
//! ```text
//! InputHumanizer (try_get_session / get_session)
//!   └─> InputLockManager (one holder, FIFO waiters, leases)
//!         └─> InputSession (per holder)
//!               ├─> DelayGenerator  (clamped Gaussian delays)
//!               ├─> KeyHoldTracker  (minimum key hold times)
//!               ├─> MotionPlanner   (linear | WindMouse paths)
//!               └─> InputBackend    (device boundary)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use input_humanizer::config::HumanizerConfig;
//! use input_humanizer::input::{MouseButton, Point, RecordingBackend};
//! use input_humanizer::InputHumanizer;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = Arc::new(RecordingBackend::new());
//! let humanizer = InputHumanizer::new(backend, HumanizerConfig::default())?;
//! let cancel = CancellationToken::new();
//!
//! if let Some(mut session) = humanizer
//!     .get_session("looter", Duration::from_millis(500), &cancel)
//!     .await
//! {
//!     session
//!         .click(MouseButton::Left, Some(Point::new(640.0, 360.0)), &cancel)
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Humanizer configuration
pub mod config;

/// Client boundary
pub mod humanizer;

/// Delay sampling and key hold tracking
pub mod humanize;

/// Device boundary and input value types
pub mod input;

/// Exclusive input lock
pub mod lock;

/// Cursor path planning
pub mod motion;

/// Humanized input session
pub mod session;

/// Utility functions
pub mod utils;

pub use config::HumanizerConfig;
pub use humanizer::InputHumanizer;
pub use input::{InputBackend, InputError, KeyCode, MouseButton, Point};
pub use lock::{InputLockManager, LockError};
pub use session::InputSession;
