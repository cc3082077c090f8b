use std::sync::Arc;
use std::time::Duration;

use input_humanizer::config::HumanizerConfig;
use input_humanizer::input::{InputEvent, KeyCode, MouseButton, Point, RecordingBackend};
use input_humanizer::motion::WindMouse;
use input_humanizer::{InputError, InputHumanizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::NamedTempFile;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn wind_config() -> HumanizerConfig {
    let mut config = HumanizerConfig::default();
    config.wind_mouse.enabled = true;
    config
}

fn humanizer(config: HumanizerConfig) -> (Arc<RecordingBackend>, InputHumanizer) {
    let backend = Arc::new(RecordingBackend::new());
    let humanizer = InputHumanizer::new(backend.clone(), config).unwrap();
    (backend, humanizer)
}

#[tokio::test(start_paused = true)]
async fn test_wind_mouse_move_follows_planned_path() {
    let config = wind_config();
    let (backend, humanizer) = humanizer(config.clone());
    let mut session = humanizer.try_get_session("mover").unwrap();
    session.reseed(11);

    let target = Point::new(800.0, -450.0);
    session
        .move_mouse(target, &CancellationToken::new())
        .await
        .unwrap();

    let planner = WindMouse::from_config(&config.wind_mouse);
    let expected = planner.plan(Point::default(), target, &mut StdRng::seed_from_u64(11));

    assert_eq!(backend.cursor_path(), expected);
    assert_eq!(backend.position(), target);
}

#[tokio::test(start_paused = true)]
async fn test_step_delays_respect_bounds() {
    let (backend, humanizer) = humanizer(wind_config());
    let mut session = humanizer.try_get_session("mover").unwrap();

    session
        .move_mouse(Point::new(600.0, 600.0), &CancellationToken::new())
        .await
        .unwrap();

    let events = backend.events();
    assert!(events.len() > 2);
    for pair in events.windows(2) {
        let gap = pair[1].at - pair[0].at;
        assert!(gap >= Duration::from_millis(2), "gap {:?} below minimum", gap);
        assert!(gap <= Duration::from_millis(10), "gap {:?} above maximum", gap);
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_path_stops_at_last_emitted_point() {
    let (backend, humanizer) = humanizer(wind_config());
    let mut session = humanizer.try_get_session("mover").unwrap();
    session.reseed(5);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
    }

    let target = Point::new(1920.0, 1080.0);
    let err = session.move_mouse(target, &cancel).await.unwrap_err();
    assert!(matches!(err, InputError::Cancelled));

    let planner = WindMouse::from_config(&wind_config().wind_mouse);
    let full = planner.plan(Point::default(), target, &mut StdRng::seed_from_u64(5));
    let emitted = backend.cursor_path();

    assert!(!emitted.is_empty());
    assert!(emitted.len() < full.len());
    assert_eq!(emitted[..], full[..emitted.len()]);
    assert_eq!(backend.position(), *emitted.last().unwrap());

    // Nothing arrives after cancellation
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(backend.cursor_path().len(), emitted.len());
}

#[tokio::test(start_paused = true)]
async fn test_linear_move_matches_step_count() {
    let (backend, humanizer) = humanizer(HumanizerConfig::default());
    let mut session = humanizer.try_get_session("mover").unwrap();

    session
        .move_mouse(Point::new(1000.0, 0.0), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(backend.cursor_path(), vec![Point::new(1000.0, 0.0)]);

    backend.take_events();
    session
        .move_mouse(Point::new(7000.0, 0.0), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        backend.cursor_path(),
        vec![
            Point::new(3000.0, 0.0),
            Point::new(5000.0, 0.0),
            Point::new(7000.0, 0.0)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_key_hold_survives_slow_caller() {
    let (backend, humanizer) = humanizer(HumanizerConfig::default());
    let mut session = humanizer.try_get_session("typist").unwrap();
    let cancel = CancellationToken::new();
    let key: KeyCode = "space".parse().unwrap();

    session.key_down(key, &cancel).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Hold time already elapsed, so release is immediate
    let before = Instant::now();
    session.key_up(key, false, &cancel).await.unwrap();
    assert_eq!(before.elapsed(), Duration::ZERO);

    let kinds: Vec<_> = backend.events().into_iter().map(|e| e.event).collect();
    assert_eq!(kinds, vec![InputEvent::KeyDown { key }, InputEvent::KeyUp { key }]);
}

#[tokio::test(start_paused = true)]
async fn test_session_keeps_config_snapshot() {
    let (_backend, humanizer) = humanizer(HumanizerConfig::default());
    let session = humanizer.try_get_session("a").unwrap();

    let mut updated = HumanizerConfig::default();
    updated.delay.minimum_delay_ms = 10;
    updated.delay.maximum_delay_ms = 20;
    updated.delay.delay_mean_ms = 15.0;
    humanizer.manager().update_config(updated.clone()).unwrap();

    assert_eq!(session.config().delay.minimum_delay_ms, 50);
    session.release();

    let next = humanizer.try_get_session("b").unwrap();
    assert_eq!(next.config().delay, updated.delay);
}

#[tokio::test(start_paused = true)]
async fn test_session_from_loaded_config() {
    let mut file = NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        br#"
[delay]
minimum_delay_ms = 5
maximum_delay_ms = 5
delay_mean_ms = 5.0

[logging]
debug = true
"#,
    )
    .unwrap();

    let config = HumanizerConfig::load(file.path()).unwrap();
    let (backend, humanizer) = humanizer(config);
    let mut session = humanizer.try_get_session("clicker").unwrap();

    session
        .click(MouseButton::Middle, None, &CancellationToken::new())
        .await
        .unwrap();

    let click = &backend.events()[0];
    assert_eq!(
        click.event,
        InputEvent::Click {
            button: MouseButton::Middle
        }
    );
    assert_eq!(click.at, Duration::from_millis(5));
}

#[tokio::test]
async fn test_dropped_session_frees_device() {
    let (_backend, humanizer) = humanizer(HumanizerConfig::default());
    {
        let _session = humanizer.try_get_session("short-lived").unwrap();
        assert!(humanizer.try_get_session("next").is_none());
    }
    assert!(humanizer.try_get_session("next").is_some());
}

#[test]
fn test_extreme_motion_config_is_rejected_up_front() {
    let mut tiny_step = HumanizerConfig::default();
    tiny_step.interpolation.maximum_distance = 1e-300;
    assert!(InputHumanizer::new(Arc::new(RecordingBackend::new()), tiny_step).is_err());

    let mut stalled = wind_config();
    stalled.wind_mouse.step_size = 0.0;
    assert!(InputHumanizer::new(Arc::new(RecordingBackend::new()), stalled).is_err());

    let mut runaway = wind_config();
    runaway.wind_mouse.gravity = f64::INFINITY;
    assert!(InputHumanizer::new(Arc::new(RecordingBackend::new()), runaway).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_override_leaves_session_usable() {
    let (backend, humanizer) = humanizer(HumanizerConfig::default());
    let mut session = humanizer.try_get_session("mover").unwrap();
    let cancel = CancellationToken::new();

    let mut params = wind_config().wind_mouse;
    params.wind = f64::NAN;
    let err = session
        .move_mouse_wind(Point::new(300.0, 300.0), &params, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, InputError::InvalidMouseEvent(_)));
    assert!(backend.events().is_empty());

    session
        .move_mouse(Point::new(300.0, 300.0), &cancel)
        .await
        .unwrap();
    assert!(backend.cursor_path().iter().all(Point::is_finite));
    assert_eq!(backend.position(), Point::new(300.0, 300.0));
}
