//! Input Device Boundary
//!
//! Value types and the device abstraction every other subsystem builds on.
//!
//! # Architecture
//!
//! ```text
//! InputSession (paced, humanized actions)
//!       ↓
//! ┌──────────────────────────┐
//! │  InputBackend (trait)    │ ← provided by the host
//! │  - key down / key up     │
//! │  - click / scroll        │
//! │  - cursor get / set      │
//! └──────────────────────────┘
//!       ↓
//! OS input primitives
//! ```
//!
//! # Error Handling
//!
//! Session operations return `Result<T, InputError>`. A cancelled action is
//! an ordinary error value, never a panic:
//!
//! ```rust,no_run
//! use input_humanizer::input::{InputError, Point};
//! # async fn example(session: &mut input_humanizer::InputSession) {
//! let cancel = tokio_util::sync::CancellationToken::new();
//! match session.move_mouse(Point::new(640.0, 360.0), &cancel).await {
//!     Ok(()) => {}
//!     Err(InputError::Cancelled) => {
//!         // cursor is wherever the last completed step left it
//!     }
//!     Err(e) => eprintln!("Input error: {}", e),
//! }
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod keyboard;
pub mod mouse;

pub use backend::{InputBackend, InputEvent, RecordedEvent, RecordingBackend};
pub use error::{classify_error, recovery_action, ErrorType, InputError, RecoveryAction, Result};
pub use keyboard::{keycodes, KeyCode};
pub use mouse::{MouseButton, Point};
