//! Input Lock Manager
//!
//! The one piece of shared mutable state in the crate. It decides which owner
//! may drive the input device and hands that owner an [`InputSession`].
//!
//! # Design
//!
//! ```text
//!   try_acquire ──┐              ┌── release(owner) / session drop
//!                 ▼              ▼
//!        Semaphore(1 permit, FIFO waiters)
//!                 │
//!                 ▼
//!        Mutex<LockState>: Free | Held { owner, lease, permit }
//! ```
//!
//! The permit lives inside the `Held` state, so "who holds the lock" and
//! "is the device taken" change together in one critical section. Dropping
//! the permit on release hands it straight to the longest-waiting
//! [`acquire`](InputLockManager::acquire) call; a later `try_acquire` cannot
//! jump the queue.
//!
//! Every grant carries a lease number. Sessions release by lease, so a stale
//! session that is dropped late can never free a lock its owner has since
//! re-acquired.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::HumanizerConfig;
use crate::input::backend::InputBackend;
use crate::lock::error::{LockError, Result};
use crate::session::InputSession;

/// Identifies one grant of the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lease(u64);

impl Lease {
    /// Raw lease number
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct Grant {
    owner: String,
    lease: Lease,
    acquired_at: Instant,
    _permit: OwnedSemaphorePermit,
}

enum LockState {
    Free,
    Held(Grant),
}

/// Lock usage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockStats {
    /// Sessions handed out
    pub acquisitions: u64,
    /// `try_acquire` calls that found the lock taken
    pub rejections: u64,
    /// `acquire` calls that ran out of time
    pub timeouts: u64,
    /// `acquire` calls abandoned through their cancellation token
    pub cancellations: u64,
    /// Grants returned
    pub releases: u64,
    /// Release requests that matched no grant
    pub ignored_releases: u64,
}

#[derive(Default)]
struct StatCounters {
    acquisitions: AtomicU64,
    rejections: AtomicU64,
    timeouts: AtomicU64,
    cancellations: AtomicU64,
    releases: AtomicU64,
    ignored_releases: AtomicU64,
}

impl StatCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LockStats {
        LockStats {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            ignored_releases: self.ignored_releases.load(Ordering::Relaxed),
        }
    }
}

struct LockShared {
    semaphore: Arc<Semaphore>,
    state: Mutex<LockState>,
    next_lease: AtomicU64,
    config: RwLock<Arc<HumanizerConfig>>,
    backend: Arc<dyn InputBackend>,
    stats: StatCounters,
}

/// Process-wide broker for exclusive input access
///
/// Construct one at startup and pass clones to every component that needs
/// input; clones share the same lock.
#[derive(Clone)]
pub struct InputLockManager {
    shared: Arc<LockShared>,
}

impl InputLockManager {
    /// Create a manager driving `backend` with a validated `config`
    pub fn new(backend: Arc<dyn InputBackend>, config: HumanizerConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(LockShared {
                semaphore: Arc::new(Semaphore::new(1)),
                state: Mutex::new(LockState::Free),
                next_lease: AtomicU64::new(1),
                config: RwLock::new(Arc::new(config)),
                backend,
                stats: StatCounters::default(),
            }),
        })
    }

    /// Configuration new sessions will snapshot
    pub fn config(&self) -> Arc<HumanizerConfig> {
        self.shared.config.read().clone()
    }

    /// Replace the configuration for future sessions
    ///
    /// Live sessions keep the snapshot they were created with.
    pub fn update_config(&self, config: HumanizerConfig) -> anyhow::Result<()> {
        config.validate()?;
        *self.shared.config.write() = Arc::new(config);
        debug!("Input humanizer configuration updated");
        Ok(())
    }

    /// Device every session emits through
    pub fn backend(&self) -> Arc<dyn InputBackend> {
        self.shared.backend.clone()
    }

    /// Claim the lock without waiting
    ///
    /// Returns `None` if any owner (including `owner` itself) holds it or
    /// waiters are queued.
    pub fn try_acquire(&self, owner: impl Into<String>) -> Option<InputSession> {
        let owner = owner.into();
        match self.shared.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Some(self.grant(owner, permit)),
            Err(_) => {
                StatCounters::bump(&self.shared.stats.rejections);
                trace!(
                    "'{}' could not take input lock (held by {:?})",
                    owner,
                    self.holder()
                );
                None
            }
        }
    }

    /// Claim the lock, waiting up to `max_wait` for the holder to release
    ///
    /// A zero `max_wait` never suspends. Waiters are served in arrival order.
    pub async fn acquire(
        &self,
        owner: impl Into<String>,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<InputSession> {
        let owner = owner.into();

        if cancel.is_cancelled() {
            StatCounters::bump(&self.shared.stats.cancellations);
            return Err(LockError::Cancelled {
                requested_by: owner,
            });
        }

        if let Ok(permit) = self.shared.semaphore.clone().try_acquire_owned() {
            return Ok(self.grant(owner, permit));
        }

        let blocking_owner = self.holder();
        if max_wait.is_zero() {
            StatCounters::bump(&self.shared.stats.timeouts);
            return Err(LockError::Timeout {
                requested_by: owner,
                holder: blocking_owner,
                waited: Duration::ZERO,
            });
        }

        debug!(
            "'{}' waiting up to {:?} for input lock held by {:?}",
            owner, max_wait, blocking_owner
        );

        let started = Instant::now();
        let acquire = self.shared.semaphore.clone().acquire_owned();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                StatCounters::bump(&self.shared.stats.cancellations);
                Err(LockError::Cancelled { requested_by: owner })
            }
            outcome = tokio::time::timeout(max_wait, acquire) => match outcome {
                Ok(Ok(permit)) => {
                    trace!("'{}' acquired input lock after {:?}", owner, started.elapsed());
                    Ok(self.grant(owner, permit))
                }
                // The semaphore is never closed; an error can only mean the
                // wait ended without a permit.
                Ok(Err(_)) | Err(_) => {
                    StatCounters::bump(&self.shared.stats.timeouts);
                    Err(LockError::Timeout {
                        requested_by: owner,
                        holder: self.holder().or(blocking_owner),
                        waited: started.elapsed(),
                    })
                }
            }
        }
    }

    /// Release the lock if `owner` holds it
    ///
    /// Releasing a lock held by someone else, or a free lock, is a no-op.
    /// Returns whether a grant was released.
    pub fn release(&self, owner: &str) -> bool {
        self.release_where(|grant| grant.owner == owner)
    }

    /// Release exactly one grant
    pub(crate) fn release_lease(&self, lease: Lease) -> bool {
        self.release_where(|grant| grant.lease == lease)
    }

    /// Free the lock whoever holds it, returning the evicted owner
    ///
    /// Meant for host shutdown; the evicted session's own release becomes a
    /// no-op.
    pub fn force_release(&self) -> Option<String> {
        let evicted = self.take_grant(|_| true)?;
        warn!("Input lock forcibly taken from '{}'", evicted.owner);
        let owner = evicted.owner.clone();
        self.finish_release(evicted);
        Some(owner)
    }

    /// Owner currently holding the lock
    pub fn holder(&self) -> Option<String> {
        match &*self.shared.state.lock() {
            LockState::Held(grant) => Some(grant.owner.clone()),
            LockState::Free => None,
        }
    }

    /// Whether any owner holds the lock
    pub fn is_held(&self) -> bool {
        matches!(&*self.shared.state.lock(), LockState::Held(_))
    }

    /// Whether `lease` is the live grant
    pub(crate) fn holds_lease(&self, lease: Lease) -> bool {
        matches!(&*self.shared.state.lock(), LockState::Held(grant) if grant.lease == lease)
    }

    /// Usage counters
    pub fn stats(&self) -> LockStats {
        self.shared.stats.snapshot()
    }

    fn grant(&self, owner: String, permit: OwnedSemaphorePermit) -> InputSession {
        let lease = Lease(self.shared.next_lease.fetch_add(1, Ordering::Relaxed));
        let config = self.config();

        {
            let mut state = self.shared.state.lock();
            debug_assert!(matches!(&*state, LockState::Free));
            *state = LockState::Held(Grant {
                owner: owner.clone(),
                lease,
                acquired_at: Instant::now(),
                _permit: permit,
            });
        }

        StatCounters::bump(&self.shared.stats.acquisitions);
        if config.logging.debug {
            debug!("'{}' got the input lock (lease {})", owner, lease.id());
        }

        InputSession::new(self.clone(), owner, lease, config)
    }

    fn release_where(&self, matches: impl Fn(&Grant) -> bool) -> bool {
        match self.take_grant(matches) {
            Some(grant) => {
                self.finish_release(grant);
                true
            }
            None => {
                StatCounters::bump(&self.shared.stats.ignored_releases);
                trace!("Ignoring release request that matches no grant");
                false
            }
        }
    }

    fn take_grant(&self, matches: impl Fn(&Grant) -> bool) -> Option<Grant> {
        let mut state = self.shared.state.lock();
        match &*state {
            LockState::Held(grant) if matches(grant) => {}
            _ => return None,
        }
        match std::mem::replace(&mut *state, LockState::Free) {
            LockState::Held(grant) => Some(grant),
            LockState::Free => None,
        }
    }

    // Runs outside the state mutex: dropping the permit may wake a waiter
    // that immediately locks the state.
    fn finish_release(&self, grant: Grant) {
        StatCounters::bump(&self.shared.stats.releases);
        info!(
            "'{}' released input lock after {:?}",
            grant.owner,
            grant.acquired_at.elapsed()
        );
        drop(grant);
    }
}

impl std::fmt::Debug for InputLockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputLockManager")
            .field("holder", &self.holder())
            .finish_non_exhaustive()
    }
}
