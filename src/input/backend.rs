//! Device Backend Boundary
//!
//! The humanizer never touches the OS directly. Raw key, button, scroll and
//! cursor primitives are supplied by the host through [`InputBackend`].
//!
//! [`RecordingBackend`] is an in-memory device: it keeps a virtual cursor
//! and a timestamped log of everything it was asked to emit. The CLI uses it
//! for dry runs and the test suite uses it to check timing and paths.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::input::keyboard::KeyCode;
use crate::input::mouse::{MouseButton, Point};

/// Raw input primitives provided by the host environment
///
/// Implementations emit immediately; all pacing happens in the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InputBackend: Send + Sync {
    /// Press a key
    async fn send_key_down(&self, key: KeyCode) -> Result<()>;

    /// Release a key
    async fn send_key_up(&self, key: KeyCode) -> Result<()>;

    /// Press and release a mouse button at the current cursor position
    async fn send_click(&self, button: MouseButton) -> Result<()>;

    /// Scroll the vertical wheel
    ///
    /// # Arguments
    ///
    /// * `forward` - true scrolls away from the user (up)
    /// * `clicks` - number of wheel detents
    async fn send_vertical_scroll(&self, forward: bool, clicks: u32) -> Result<()>;

    /// Current absolute cursor position
    async fn cursor_position(&self) -> Result<Point>;

    /// Warp the cursor to an absolute position
    async fn set_cursor_position(&self, position: Point) -> Result<()>;
}

/// Event emitted to a device
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Key pressed
    KeyDown {
        /// Key identifier
        key: KeyCode,
    },
    /// Key released
    KeyUp {
        /// Key identifier
        key: KeyCode,
    },
    /// Button clicked
    Click {
        /// Button that was clicked
        button: MouseButton,
    },
    /// Wheel scrolled
    VerticalScroll {
        /// Scroll direction
        forward: bool,
        /// Wheel detents
        clicks: u32,
    },
    /// Cursor moved to absolute position
    CursorMove {
        /// New position
        position: Point,
    },
}

/// Event captured by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedEvent {
    /// Time since the backend was created
    #[serde(serialize_with = "serialize_millis")]
    pub at: Duration,
    /// What was emitted
    #[serde(flatten)]
    pub event: InputEvent,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

struct RecorderState {
    position: Point,
    events: Vec<RecordedEvent>,
}

/// In-memory input device
pub struct RecordingBackend {
    started: Instant,
    state: Mutex<RecorderState>,
}

impl RecordingBackend {
    /// Create a recorder with the cursor at the origin
    pub fn new() -> Self {
        Self::with_position(Point::default())
    }

    /// Create a recorder with the cursor at `position`
    pub fn with_position(position: Point) -> Self {
        Self {
            started: Instant::now(),
            state: Mutex::new(RecorderState {
                position,
                events: Vec::new(),
            }),
        }
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().events.clone()
    }

    /// Drain recorded events
    pub fn take_events(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    /// Positions of every cursor move, in order
    pub fn cursor_path(&self) -> Vec<Point> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e.event {
                InputEvent::CursorMove { position } => Some(position),
                _ => None,
            })
            .collect()
    }

    /// Current virtual cursor position
    pub fn position(&self) -> Point {
        self.state.lock().position
    }

    fn record(&self, event: InputEvent) {
        let at = self.started.elapsed();
        trace!("Recorded {:?} at {:?}", event, at);
        self.state.lock().events.push(RecordedEvent { at, event });
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputBackend for RecordingBackend {
    async fn send_key_down(&self, key: KeyCode) -> Result<()> {
        self.record(InputEvent::KeyDown { key });
        Ok(())
    }

    async fn send_key_up(&self, key: KeyCode) -> Result<()> {
        self.record(InputEvent::KeyUp { key });
        Ok(())
    }

    async fn send_click(&self, button: MouseButton) -> Result<()> {
        self.record(InputEvent::Click { button });
        Ok(())
    }

    async fn send_vertical_scroll(&self, forward: bool, clicks: u32) -> Result<()> {
        self.record(InputEvent::VerticalScroll { forward, clicks });
        Ok(())
    }

    async fn cursor_position(&self) -> Result<Point> {
        Ok(self.position())
    }

    async fn set_cursor_position(&self, position: Point) -> Result<()> {
        self.state.lock().position = position;
        self.record(InputEvent::CursorMove { position });
        Ok(())
    }
}
