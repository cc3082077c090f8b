//! Key Hold Scheduling
//!
//! Tracks, per pressed key, the earliest instant at which it may be released.
//! A key is present exactly while it has been sent down and not yet up.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::input::keyboard::KeyCode;

/// Per-key scheduled release times
#[derive(Debug, Default)]
pub struct KeyHoldTracker {
    releases: HashMap<KeyCode, Instant>,
}

impl KeyHoldTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down; the key may not be released for `hold`
    ///
    /// Pressing an already held key reschedules it from now.
    pub fn record_press(&mut self, key: KeyCode, hold: Duration) -> Instant {
        self.record_press_at(key, Instant::now(), hold)
    }

    /// [`record_press`](Self::record_press) with an explicit clock reading
    pub fn record_press_at(&mut self, key: KeyCode, now: Instant, hold: Duration) -> Instant {
        let release_at = now + hold;
        trace!("Key {} held until +{:?}", key, hold);
        self.releases.insert(key, release_at);
        release_at
    }

    /// Scheduled release instant for `key`, if it is held
    pub fn scheduled_release(&self, key: KeyCode) -> Option<Instant> {
        self.releases.get(&key).copied()
    }

    /// Time left before `key` may be released
    ///
    /// Unknown keys are treated as already due.
    pub fn remaining(&self, key: KeyCode) -> Duration {
        self.remaining_at(key, Instant::now())
    }

    /// [`remaining`](Self::remaining) with an explicit clock reading
    pub fn remaining_at(&self, key: KeyCode, now: Instant) -> Duration {
        self.releases
            .get(&key)
            .map(|release_at| release_at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Forget `key` after its up-event was emitted
    pub fn release(&mut self, key: KeyCode) -> Option<Instant> {
        self.releases.remove(&key)
    }

    /// Whether `key` is currently down
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.releases.contains_key(&key)
    }

    /// All keys currently down, in keycode order
    pub fn held_keys(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self.releases.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Number of keys currently down
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// No key is down
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
