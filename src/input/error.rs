//! Input Error Types
//!
//! Every failure an input session can report. None of them are fatal: a
//! cancelled or failed action is returned to the caller as a value and the
//! session stays usable.

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input session error types
#[derive(Error, Debug)]
pub enum InputError {
    /// The caller's cancellation token fired during a delay or mid-path
    ///
    /// The device may be partially updated (a key already sent down stays
    /// down, the cursor stays at the last emitted position).
    #[error("Input operation cancelled")]
    Cancelled,

    /// The device backend rejected an event
    #[error("Input backend error: {0}")]
    Backend(String),

    /// Key name or code could not be resolved
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid mouse event
    #[error("Invalid mouse event: {0}")]
    InvalidMouseEvent(String),

    /// The session already gave its lock back
    #[error("Input session for '{0}' has already been released")]
    SessionReleased(String),
}

impl From<anyhow::Error> for InputError {
    fn from(error: anyhow::Error) -> Self {
        InputError::Backend(format!("{:#}", error))
    }
}

impl InputError {
    /// True when the action was aborted by the caller rather than failed
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InputError::Cancelled)
    }

    /// Whether the session can keep going after this error
    ///
    /// Nothing an input action reports is fatal; see [`recovery_action`]
    /// for what the caller should do next.
    pub fn is_recoverable(&self) -> bool {
        match self {
            InputError::Cancelled
            | InputError::Backend(_)
            | InputError::InvalidKey(_)
            | InputError::InvalidMouseEvent(_)
            | InputError::SessionReleased(_) => true,
        }
    }
}

/// Error classification for recovery strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Caller-requested abort
    Cancellation,
    /// Device backend failures
    Device,
    /// Bad arguments (unknown key, non-finite coordinate)
    Argument,
    /// Session lifecycle errors
    State,
}

/// Classify error for recovery strategy selection
pub fn classify_error(error: &InputError) -> ErrorType {
    match error {
        InputError::Cancelled => ErrorType::Cancellation,
        InputError::Backend(_) => ErrorType::Device,
        InputError::InvalidKey(_) | InputError::InvalidMouseEvent(_) => ErrorType::Argument,
        InputError::SessionReleased(_) => ErrorType::State,
    }
}

/// Recovery action to take after error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Send compensating key-up events for keys still held, then carry on
    ReleaseHeldKeys,
    /// Try the action again later
    Retry,
    /// Fix the request; retrying unchanged will fail the same way
    Fail,
    /// Acquire a new session
    RequestNewSession,
}

/// Determine recovery action for error
pub fn recovery_action(error: &InputError) -> RecoveryAction {
    match classify_error(error) {
        ErrorType::Cancellation => RecoveryAction::ReleaseHeldKeys,
        ErrorType::Device => RecoveryAction::Retry,
        ErrorType::Argument => RecoveryAction::Fail,
        ErrorType::State => RecoveryAction::RequestNewSession,
    }
}
