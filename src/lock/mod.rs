//! Exclusive Input Access
//!
//! Only one owner may drive the mouse and keyboard at a time. Owners ask the
//! [`InputLockManager`] for a session, either without waiting
//! ([`try_acquire`](InputLockManager::try_acquire)) or with a timeout
//! ([`acquire`](InputLockManager::acquire)). The session *is* the grant:
//! releasing or dropping it frees the lock.
//!
//! # Waiter policy
//!
//! Waiters are served first-come, first-served. When the holder releases,
//! the oldest pending `acquire` receives the lock; a `try_acquire` issued
//! meanwhile fails.

pub mod error;
pub mod manager;

pub use error::LockError;
pub use manager::{InputLockManager, Lease, LockStats};
