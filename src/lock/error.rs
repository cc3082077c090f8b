//! Lock Acquisition Errors

use std::time::Duration;
use thiserror::Error;

/// Result type for lock operations
pub type Result<T> = std::result::Result<T, LockError>;

/// Why a blocking acquisition did not produce a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Another owner kept the lock for the whole wait
    #[error(
        "'{requested_by}' requested the input lock but {} is still holding it after {waited:?}; try again later",
        describe_holder(.holder)
    )]
    Timeout {
        /// Owner that asked for the lock
        requested_by: String,
        /// Owner blocking the request (None only mid-handoff)
        holder: Option<String>,
        /// How long the caller waited
        waited: Duration,
    },

    /// The caller's cancellation token fired while waiting
    #[error("'{requested_by}' stopped waiting for the input lock")]
    Cancelled {
        /// Owner that asked for the lock
        requested_by: String,
    },
}

fn describe_holder(holder: &Option<String>) -> String {
    match holder {
        Some(owner) => format!("'{}'", owner),
        None => "another owner".to_string(),
    }
}

impl LockError {
    /// Owner currently blocking the request, if known
    pub fn holder(&self) -> Option<&str> {
        match self {
            LockError::Timeout { holder, .. } => holder.as_deref(),
            LockError::Cancelled { .. } => None,
        }
    }

    /// Every lock error is transient; the caller may simply retry
    pub fn is_recoverable(&self) -> bool {
        true
    }
}
