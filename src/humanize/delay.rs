//! Bounded-Gaussian Delays
//!
//! Every pause the humanizer inserts is drawn from a normal distribution and
//! clamped into a configured window. Clamping (instead of re-sampling) keeps
//! sampling O(1) even when the mean sits far outside `[min, max]`.
//!
//! # Waiting
//!
//! [`wait`] is the single suspension primitive used by sessions and motion
//! paths. It checks the cancellation token before suspending, so a cancelled
//! caller never starts a new delay, not even a zero-length one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::input::error::{InputError, Result};

/// Delay distribution in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower clamp bound
    pub min_ms: u64,
    /// Upper clamp bound
    pub max_ms: u64,
    /// Mean of the underlying normal distribution
    pub mean_ms: f64,
    /// Standard deviation of the underlying normal distribution
    pub std_dev_ms: f64,
}

impl DelayRange {
    /// Create a delay range
    pub fn new(min_ms: u64, max_ms: u64, mean_ms: f64, std_dev_ms: f64) -> Self {
        Self {
            min_ms,
            max_ms,
            mean_ms,
            std_dev_ms,
        }
    }

    /// Distribution anchored on the window itself
    ///
    /// Used for per-step motion delays, which are configured only by their
    /// bounds: the mean is the midpoint and the spread is wide enough that
    /// the clamp, not the bell, shapes most of the draw.
    pub fn from_bounds(min_ms: u64, max_ms: u64) -> Self {
        let (lo, hi) = ordered(min_ms, max_ms);
        let span = (hi - lo) as f64;
        Self {
            min_ms: lo,
            max_ms: hi,
            mean_ms: lo as f64 + span / 2.0,
            std_dev_ms: span / 2.0,
        }
    }

    /// A delay that is always exactly `ms`
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, ms, ms as f64, 0.0)
    }

    /// Draw one delay
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = ordered(self.min_ms, self.max_ms);
        let (lo, hi) = (lo as f64, hi as f64);

        let value = if self.std_dev_ms > 0.0 && self.std_dev_ms.is_finite() {
            self.mean_ms + standard_normal(rng) * self.std_dev_ms
        } else {
            self.mean_ms
        };

        let value = if value.is_nan() { lo } else { value.clamp(lo, hi) };
        Duration::from_millis(value.round() as u64)
    }
}

fn ordered(a: u64, b: u64) -> (u64, u64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Standard normal variate via Box-Muller
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps ln() away from zero
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Per-session source of randomness for delays and motion
pub struct DelayGenerator {
    rng: StdRng,
}

impl DelayGenerator {
    /// Generator seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator, for reproducible paths and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one delay from `range`
    pub fn sample(&mut self, range: &DelayRange) -> Duration {
        range.sample(&mut self.rng)
    }

    /// Underlying RNG, shared with the motion planner
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for DelayGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DelayGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayGenerator").finish_non_exhaustive()
    }
}

/// Suspend for `duration` unless `cancel` fires first
pub async fn wait(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(InputError::Cancelled);
    }
    if duration.is_zero() {
        return Ok(());
    }

    trace!("Waiting {:?}", duration);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(InputError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_samples_stay_in_bounds_and_center_on_mean() {
        let range = DelayRange::new(50, 150, 100.0, 50.0);
        let mut generator = DelayGenerator::seeded(7);

        let mut total = 0.0;
        for _ in 0..10_000 {
            let ms = generator.sample(&range).as_millis() as u64;
            assert!((50..=150).contains(&ms), "sample {} out of bounds", ms);
            total += ms as f64;
        }

        let mean = total / 10_000.0;
        assert!((mean - 100.0).abs() < 3.0, "empirical mean {}", mean);
    }

    #[test]
    fn test_mean_outside_window_clamps() {
        let mut generator = DelayGenerator::seeded(1);

        let above = DelayRange::new(10, 20, 500.0, 1.0);
        for _ in 0..100 {
            assert_eq!(generator.sample(&above), Duration::from_millis(20));
        }

        let below = DelayRange::new(10, 20, -500.0, 1.0);
        for _ in 0..100 {
            assert_eq!(generator.sample(&below), Duration::from_millis(10));
        }
    }

    #[test]
    fn test_zero_std_dev_returns_clamped_mean() {
        let mut generator = DelayGenerator::seeded(3);
        let range = DelayRange::new(0, 100, 42.0, 0.0);
        assert_eq!(generator.sample(&range), Duration::from_millis(42));
    }

    #[test]
    fn test_fixed_range() {
        let mut generator = DelayGenerator::seeded(3);
        assert_eq!(
            generator.sample(&DelayRange::fixed(25)),
            Duration::from_millis(25)
        );
    }

    #[test]
    fn test_from_bounds_midpoint() {
        let range = DelayRange::from_bounds(0, 1000);
        assert_eq!(range.mean_ms, 500.0);
        assert_eq!(range.min_ms, 0);
        assert_eq!(range.max_ms, 1000);

        let swapped = DelayRange::from_bounds(30, 10);
        assert_eq!((swapped.min_ms, swapped.max_ms), (10, 30));
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let range = DelayRange::new(0, 1000, 300.0, 200.0);
        let mut a = DelayGenerator::seeded(99);
        let mut b = DelayGenerator::seeded(99);
        for _ in 0..50 {
            assert_eq!(a.sample(&range), b.sample(&range));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes() {
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        wait(Duration::from_millis(200), &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_wait_refuses_when_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = wait(Duration::ZERO, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_aborts_early_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let result = wait(Duration::from_secs(10), &cancel).await;
        assert!(matches!(result, Err(InputError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    proptest! {
        #[test]
        fn prop_sample_within_bounds(
            min in 0u64..2_000,
            span in 0u64..2_000,
            mean in -5_000.0f64..5_000.0,
            std_dev in 0.0f64..3_000.0,
            seed in any::<u64>(),
        ) {
            let range = DelayRange::new(min, min + span, mean, std_dev);
            let mut generator = DelayGenerator::seeded(seed);
            for _ in 0..32 {
                let ms = generator.sample(&range).as_millis() as u64;
                prop_assert!(ms >= min && ms <= min + span);
            }
        }
    }
}
