//! Client Boundary
//!
//! [`InputHumanizer`] is what hosting code holds on to. It owns the lock
//! manager and translates lock outcomes into the `Option<InputSession>`
//! contract clients expect, reporting failures through the log rather than
//! as errors.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::HumanizerConfig;
use crate::input::backend::InputBackend;
use crate::lock::{InputLockManager, LockError};
use crate::session::InputSession;

/// Entry point for clients that want humanized input
#[derive(Debug, Clone)]
pub struct InputHumanizer {
    manager: InputLockManager,
}

impl InputHumanizer {
    /// Create a humanizer driving `backend`
    pub fn new(backend: Arc<dyn InputBackend>, config: HumanizerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            manager: InputLockManager::new(backend, config)?,
        })
    }

    /// Wrap an existing manager
    pub fn with_manager(manager: InputLockManager) -> Self {
        Self { manager }
    }

    /// Underlying lock manager
    pub fn manager(&self) -> &InputLockManager {
        &self.manager
    }

    /// Take a session if the device is free right now
    pub fn try_get_session(&self, owner: impl Into<String>) -> Option<InputSession> {
        let owner = owner.into();
        if !self.accepting(&owner) {
            return None;
        }

        let session = self.manager.try_acquire(owner.as_str())?;
        self.log_acquired(&session);
        Some(session)
    }

    /// Take a session, waiting up to `wait` for the current holder
    ///
    /// On timeout the blocking owner is logged at error level.
    pub async fn get_session(
        &self,
        owner: impl Into<String>,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Option<InputSession> {
        let owner = owner.into();
        if !self.accepting(&owner) {
            return None;
        }

        match self.manager.acquire(owner.as_str(), wait, cancel).await {
            Ok(session) => {
                self.log_acquired(&session);
                Some(session)
            }
            Err(err @ LockError::Timeout { .. }) => {
                error!("Failed to acquire input lock: {}", err);
                None
            }
            Err(err @ LockError::Cancelled { .. }) => {
                debug!("{}", err);
                None
            }
        }
    }

    fn accepting(&self, owner: &str) -> bool {
        if self.manager.config().enabled {
            return true;
        }
        warn!("Input humanizer disabled; refusing session for '{}'", owner);
        false
    }

    fn log_acquired(&self, session: &InputSession) {
        if session.config().logging.debug {
            debug!(
                "Input lock acquired by '{}' (lease {})",
                session.owner(),
                session.lease().id()
            );
        }
    }
}
