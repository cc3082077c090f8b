//! Input Session
//!
//! The facade clients drive. A session exists only while its owner holds the
//! input lock, and every action it performs is paced by sampled delays:
//!
//! ```text
//! key_down   : delay → down → schedule earliest release
//! key_up     : wait for scheduled release (unless immediate) → up
//! click      : [move] → delay → click → delay
//! scroll     : [move] → delay → scroll → delay
//! move_mouse : plan path → emit point, step delay, emit point, ... target
//! ```
//!
//! All actions take a [`CancellationToken`]. Cancellation surfaces as
//! [`InputError::Cancelled`]; whatever was already emitted stays applied.
//!
//! Calls on one session must not overlap; `&mut self` enforces that.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{HumanizerConfig, InterpolationConfig, WindMouseConfig};
use crate::humanize::{wait, DelayGenerator, KeyHoldTracker};
use crate::input::backend::InputBackend;
use crate::input::error::{InputError, Result};
use crate::input::keyboard::KeyCode;
use crate::input::mouse::{MouseButton, Point};
use crate::lock::{InputLockManager, Lease};
use crate::motion::{LinearInterpolation, MotionPlanner, WindMouse};

/// Exclusive, humanized access to the input device
pub struct InputSession {
    manager: InputLockManager,
    owner: String,
    lease: Lease,
    config: Arc<HumanizerConfig>,
    backend: Arc<dyn InputBackend>,
    planner: MotionPlanner,
    delays: DelayGenerator,
    keys: KeyHoldTracker,
    released: bool,
}

impl InputSession {
    pub(crate) fn new(
        manager: InputLockManager,
        owner: String,
        lease: Lease,
        config: Arc<HumanizerConfig>,
    ) -> Self {
        let backend = manager.backend();
        let planner = MotionPlanner::from_config(&config);
        Self {
            manager,
            owner,
            lease,
            config,
            backend,
            planner,
            delays: DelayGenerator::new(),
            keys: KeyHoldTracker::new(),
            released: false,
        }
    }

    /// Owner this session was granted to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Grant backing this session
    pub fn lease(&self) -> Lease {
        self.lease
    }

    /// Configuration snapshot taken at acquisition
    pub fn config(&self) -> &HumanizerConfig {
        &self.config
    }

    /// Keys sent down and not yet up
    pub fn held_keys(&self) -> Vec<KeyCode> {
        self.keys.held_keys()
    }

    /// Earliest instant `key` may be released, if it is held
    pub fn scheduled_release(&self, key: KeyCode) -> Option<Instant> {
        self.keys.scheduled_release(key)
    }

    /// Whether the session still owns the input lock
    pub fn is_active(&self) -> bool {
        !self.released && self.manager.holds_lease(self.lease)
    }

    /// Replace the random source with a seeded one
    pub fn reseed(&mut self, seed: u64) {
        self.delays = DelayGenerator::seeded(seed);
    }

    /// One sample from the general delay distribution
    pub fn generate_delay(&mut self) -> Duration {
        self.delays.sample(&self.config.delay.range())
    }

    /// Press `key` after a humanized pause
    ///
    /// The key gets a sampled minimum hold time; [`key_up`](Self::key_up)
    /// will not release it earlier unless asked to.
    pub async fn key_down(&mut self, key: KeyCode, cancel: &CancellationToken) -> Result<()> {
        self.ensure_active()?;
        self.pause(cancel).await?;

        self.narrate(format_args!("KeyDown: {}", key));
        self.backend.send_key_down(key).await?;

        let hold = self.generate_delay();
        self.keys.record_press(key, hold);
        Ok(())
    }

    /// Release `key`, honouring its minimum hold time
    ///
    /// With `release_immediately` the hold time is skipped. A key with no
    /// recorded press is released at once.
    pub async fn key_up(
        &mut self,
        key: KeyCode,
        release_immediately: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_active()?;

        if !release_immediately {
            let remaining = self.keys.remaining(key);
            if !remaining.is_zero() {
                self.narrate(format_args!(
                    "KeyUp remaining delay key: {} delay: {:?}",
                    key, remaining
                ));
                wait(remaining, cancel).await?;
            }
        }

        self.narrate(format_args!("KeyUp: {}", key));
        self.backend.send_key_up(key).await?;
        self.keys.release(key);
        Ok(())
    }

    /// Click `button`, first moving to `at` if given
    ///
    /// If the move fails or is cancelled, no click is sent.
    pub async fn click(
        &mut self,
        button: MouseButton,
        at: Option<Point>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_active()?;
        if let Some(target) = at {
            self.move_mouse(target, cancel).await?;
        }

        self.narrate(format_args!("Click Delay"));
        self.pause(cancel).await?;

        self.narrate(format_args!("Click {}", button));
        self.backend.send_click(button).await?;

        self.narrate(format_args!("Click Delay 2"));
        self.pause(cancel).await
    }

    /// Left click at the current cursor position
    pub async fn click_default(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.click(MouseButton::Left, None, cancel).await
    }

    /// Scroll the wheel `clicks` detents, first moving to `at` if given
    pub async fn vertical_scroll(
        &mut self,
        forward: bool,
        clicks: u32,
        at: Option<Point>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_active()?;
        if let Some(target) = at {
            self.move_mouse(target, cancel).await?;
        }

        self.narrate(format_args!("Vertical Scroll Delay"));
        self.pause(cancel).await?;

        self.narrate(format_args!(
            "Vertical Scroll {} x{}",
            if forward { "forward" } else { "backward" },
            clicks
        ));
        self.backend.send_vertical_scroll(forward, clicks).await?;

        self.narrate(format_args!("Vertical Scroll Delay 2"));
        self.pause(cancel).await
    }

    /// Move the cursor to `to` with the configured strategy
    pub async fn move_mouse(&mut self, to: Point, cancel: &CancellationToken) -> Result<()> {
        let planner = self.planner.clone();
        self.follow_path(&planner, to, cancel).await
    }

    /// Move with straight-line interpolation and explicit parameters
    ///
    /// `params` are validated like the config section; rejected parameters
    /// yield [`InputError::InvalidMouseEvent`] before anything is emitted.
    pub async fn move_mouse_linear(
        &mut self,
        to: Point,
        params: &InterpolationConfig,
        cancel: &CancellationToken,
    ) -> Result<()> {
        params.validate().map_err(invalid_motion)?;
        let planner = MotionPlanner::from(LinearInterpolation::from_config(params));
        self.follow_path(&planner, to, cancel).await
    }

    /// Move with WindMouse and explicit parameters
    ///
    /// `params` are validated like the config section; rejected parameters
    /// yield [`InputError::InvalidMouseEvent`] before anything is emitted.
    pub async fn move_mouse_wind(
        &mut self,
        to: Point,
        params: &WindMouseConfig,
        cancel: &CancellationToken,
    ) -> Result<()> {
        params.validate().map_err(invalid_motion)?;
        let planner = MotionPlanner::from(WindMouse::from_config(params));
        self.follow_path(&planner, to, cancel).await
    }

    /// Give the input lock back
    ///
    /// Dropping the session does the same; calling this just makes the
    /// moment explicit.
    pub fn release(mut self) {
        self.release_lock();
    }

    async fn follow_path(
        &mut self,
        planner: &MotionPlanner,
        to: Point,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_active()?;
        let to = to.validate()?;
        if cancel.is_cancelled() {
            return Err(InputError::Cancelled);
        }

        let from = self.backend.cursor_position().await?;
        self.narrate(format_args!(
            "Mouse Move start {} -> {} ({})",
            from,
            to,
            planner.name()
        ));

        let path = planner.plan(from, to, self.delays.rng());
        let step_delay = planner.step_delay();

        for (index, point) in path.into_iter().enumerate() {
            if index > 0 {
                let delay = self.delays.sample(&step_delay);
                wait(delay, cancel).await?;
            }
            let point = point.validate()?;
            self.backend.set_cursor_position(point).await?;
        }

        Ok(())
    }

    async fn pause(&mut self, cancel: &CancellationToken) -> Result<()> {
        let delay = self.generate_delay();
        wait(delay, cancel).await
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(InputError::SessionReleased(self.owner.clone()))
        }
    }

    fn narrate(&self, message: fmt::Arguments<'_>) {
        if self.config.logging.debug {
            debug!(owner = %self.owner, "{}", message);
        }
    }

    fn release_lock(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if !self.keys.is_empty() {
            warn!(
                "'{}' released the input lock with keys still down: {:?}",
                self.owner,
                self.keys.held_keys()
            );
        }
        self.manager.release_lease(self.lease);
    }
}

fn invalid_motion(error: anyhow::Error) -> InputError {
    InputError::InvalidMouseEvent(format!("{:#}", error))
}

impl Drop for InputSession {
    fn drop(&mut self) {
        self.release_lock();
    }
}

impl fmt::Debug for InputSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSession")
            .field("owner", &self.owner)
            .field("lease", &self.lease)
            .field("planner", &self.planner.name())
            .field("held_keys", &self.keys.held_keys())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::backend::{InputEvent, MockInputBackend, RecordingBackend};
    use crate::config::MIN_STEP_SIZE;
    use crate::input::keyboard::keycodes;

    const KEY_W: KeyCode = KeyCode(keycodes::KEY_W);

    fn setup(config: HumanizerConfig) -> (Arc<RecordingBackend>, InputLockManager) {
        let backend = Arc::new(RecordingBackend::new());
        let manager = InputLockManager::new(backend.clone(), config).unwrap();
        (backend, manager)
    }

    fn event_at(backend: &RecordingBackend, wanted: &InputEvent) -> Duration {
        backend
            .events()
            .into_iter()
            .find(|e| &e.event == wanted)
            .map(|e| e.at)
            .expect("event recorded")
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_up_waits_for_scheduled_release() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("walker").unwrap();
        session.reseed(1);
        let cancel = CancellationToken::new();

        session.key_down(KEY_W, &cancel).await.unwrap();
        let release_at = session.scheduled_release(KEY_W).unwrap();
        assert_eq!(session.held_keys(), vec![KEY_W]);

        session.key_up(KEY_W, false, &cancel).await.unwrap();
        assert!(Instant::now() >= release_at);
        assert!(session.held_keys().is_empty());

        let down = event_at(&backend, &InputEvent::KeyDown { key: KEY_W });
        let up = event_at(&backend, &InputEvent::KeyUp { key: KEY_W });
        assert!(up - down >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_up_immediate_skips_hold() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("walker").unwrap();
        let cancel = CancellationToken::new();

        session.key_down(KEY_W, &cancel).await.unwrap();
        session.key_up(KEY_W, true, &cancel).await.unwrap();

        let down = event_at(&backend, &InputEvent::KeyDown { key: KEY_W });
        let up = event_at(&backend, &InputEvent::KeyUp { key: KEY_W });
        assert_eq!(up, down);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_up_without_press_is_immediate() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("walker").unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        session.key_up(KEY_W, false, &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(backend.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_key_up_leaves_key_held() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("walker").unwrap();
        let cancel = CancellationToken::new();

        session.key_down(KEY_W, &cancel).await.unwrap();
        cancel.cancel();
        let err = session.key_up(KEY_W, false, &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(session.held_keys(), vec![KEY_W]);
        assert!(!backend
            .events()
            .iter()
            .any(|e| e.event == InputEvent::KeyUp { key: KEY_W }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_brackets_event_with_delays() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("clicker").unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        session.click_default(&cancel).await.unwrap();
        let total = start.elapsed();

        let click = event_at(
            &backend,
            &InputEvent::Click {
                button: MouseButton::Left,
            },
        );
        assert!(click >= Duration::from_millis(50));
        assert!(total - click >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_at_moves_first() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("clicker").unwrap();
        let cancel = CancellationToken::new();
        let target = Point::new(300.0, 200.0);

        session
            .click(MouseButton::Right, Some(target), &cancel)
            .await
            .unwrap();

        let events = backend.events();
        assert_eq!(
            events[0].event,
            InputEvent::CursorMove { position: target }
        );
        assert_eq!(
            events[1].event,
            InputEvent::Click {
                button: MouseButton::Right
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_at_moves_then_scrolls() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("scroller").unwrap();
        let cancel = CancellationToken::new();

        session
            .vertical_scroll(false, 4, Some(Point::new(10.0, 10.0)), &cancel)
            .await
            .unwrap();

        assert_eq!(backend.position(), Point::new(10.0, 10.0));
        assert_eq!(
            backend.events().last().unwrap().event,
            InputEvent::VerticalScroll {
                forward: false,
                clicks: 4
            }
        );
    }

    #[tokio::test]
    async fn test_failed_move_skips_click() {
        let mut mock = MockInputBackend::new();
        mock.expect_cursor_position()
            .returning(|| Ok(Point::new(0.0, 0.0)));
        mock.expect_set_cursor_position()
            .returning(|_| Err(anyhow::anyhow!("pointer device unavailable")));
        mock.expect_send_click().never();

        let mut config = HumanizerConfig::default();
        config.delay.minimum_delay_ms = 0;
        config.delay.maximum_delay_ms = 0;
        config.delay.delay_mean_ms = 0.0;
        let manager = InputLockManager::new(Arc::new(mock), config).unwrap();
        let mut session = manager.try_acquire("clicker").unwrap();
        let cancel = CancellationToken::new();

        let err = session
            .click(MouseButton::Left, Some(Point::new(5.0, 5.0)), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Backend(msg) if msg.contains("unavailable")));
    }

    #[tokio::test]
    async fn test_cancelled_move_skips_scroll() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("scroller").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = session
            .vertical_scroll(true, 1, Some(Point::new(50.0, 50.0)), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(backend.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_linear_explicit_params() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        let cancel = CancellationToken::new();
        let params = InterpolationConfig {
            maximum_distance: 2560.0,
            minimum_delay_ms: 1,
            maximum_delay_ms: 2,
        };

        session
            .move_mouse_linear(Point::new(6000.0, 0.0), &params, &cancel)
            .await
            .unwrap();

        assert_eq!(
            backend.cursor_path(),
            vec![
                Point::new(2000.0, 0.0),
                Point::new(4000.0, 0.0),
                Point::new(6000.0, 0.0)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_rejects_non_finite_target() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        let cancel = CancellationToken::new();

        let err = session
            .move_mouse(Point::new(f64::NAN, 0.0), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidMouseEvent(_)));
        assert!(backend.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_wind_rejects_non_finite_gravity() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        let params = WindMouseConfig {
            gravity: f64::NAN,
            ..WindMouseConfig::default()
        };

        let err = session
            .move_mouse_wind(Point::new(100.0, 100.0), &params, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, InputError::InvalidMouseEvent(msg) if msg.contains("gravity")));
        assert!(backend.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_wind_rejects_zero_step_size() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        let params = WindMouseConfig {
            step_size: 0.0,
            ..WindMouseConfig::default()
        };

        let err = session
            .move_mouse_wind(Point::new(100.0, 100.0), &params, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, InputError::InvalidMouseEvent(msg) if msg.contains("step_size")));
        assert!(backend.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_linear_rejects_tiny_step_distance() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        let params = InterpolationConfig {
            maximum_distance: 1e-300,
            ..InterpolationConfig::default()
        };

        let err = session
            .move_mouse_linear(Point::new(1000.0, 0.0), &params, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(
            matches!(err, InputError::InvalidMouseEvent(msg) if msg.contains("maximum_distance"))
        );
        assert!(backend.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_wind_small_valid_step_stays_finite() {
        let (backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("mover").unwrap();
        session.reseed(4);
        let params = WindMouseConfig {
            step_size: MIN_STEP_SIZE,
            minimum_delay_ms: 0,
            maximum_delay_ms: 0,
            ..WindMouseConfig::default()
        };
        let target = Point::new(60.0, 40.0);

        session
            .move_mouse_wind(target, &params, &CancellationToken::new())
            .await
            .unwrap();

        let path = backend.cursor_path();
        assert!(path.iter().all(Point::is_finite));
        assert_eq!(*path.last().unwrap(), target);
        if path.len() > 1 {
            let before_snap = path[path.len() - 2];
            assert!(before_snap.distance_to(target) <= params.target_area);
        }
    }

    #[tokio::test]
    async fn test_evicted_session_refuses_actions() {
        let (_backend, manager) = setup(HumanizerConfig::default());
        let mut session = manager.try_acquire("victim").unwrap();
        manager.force_release();

        assert!(!session.is_active());
        let err = session
            .key_down(KEY_W, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::SessionReleased(owner) if owner == "victim"));
    }

    #[tokio::test]
    async fn test_release_frees_lock_once() {
        let (_backend, manager) = setup(HumanizerConfig::default());
        let session = manager.try_acquire("a").unwrap();
        session.release();

        assert!(!manager.is_held());
        let stats = manager.stats();
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.ignored_releases, 0);
    }
}
