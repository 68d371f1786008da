use handson::fatigue::FatigueCounter;
use handson::injection::{InputEvent, MouseButton, RecordingInjector, ScreenSize, VirtualClock};
use handson::motion::{MovementStyle, Point};
use handson::pointer::{MovementRequest, PointerActuator, ScreenTarget};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

const SCREEN: ScreenSize = ScreenSize::new(1920.0, 1080.0);

fn actuator(seed: u64) -> (PointerActuator, RecordingInjector, VirtualClock) {
    let recorder = RecordingInjector::new(SCREEN);
    recorder.set_cursor(Point::new(100.0, 100.0));
    let clock = VirtualClock::new();
    let actuator = PointerActuator::new(
        recorder.clone(),
        Arc::new(clock.clone()),
        Arc::new(FatigueCounter::new()),
    )
    .with_rng(StdRng::seed_from_u64(seed));
    (actuator, recorder, clock)
}

fn first_move(events: &[InputEvent]) -> Option<Point> {
    events.iter().find_map(|e| match e {
        InputEvent::MoveTo(p) => Some(*p),
        _ => None,
    })
}

fn last_move(events: &[InputEvent]) -> Option<Point> {
    events.iter().rev().find_map(|e| match e {
        InputEvent::MoveTo(p) => Some(*p),
        _ => None,
    })
}

#[test]
fn test_move_lands_exactly_on_target() {
    let (mut actuator, recorder, _clock) = actuator(1);
    for target in [
        Point::new(1500.0, 900.0),
        Point::new(10.0, 1070.0),
        Point::new(960.0, 540.0),
    ] {
        let report = actuator.move_to(MovementRequest::to(target)).unwrap();
        assert!(report.style.is_some());
        assert_eq!(last_move(&recorder.events()), Some(target));
    }
}

#[test]
fn test_path_starts_at_live_cursor() {
    let (mut actuator, recorder, _clock) = actuator(13);
    recorder.set_cursor(Point::new(250.0, 300.0));
    actuator
        .move_to(MovementRequest::to(Point::new(1200.0, 800.0)))
        .unwrap();
    assert_eq!(first_move(&recorder.events()), Some(Point::new(250.0, 300.0)));

    // The user moves the mouse between calls
    recorder.clear();
    recorder.set_cursor(Point::new(40.0, 1000.0));
    actuator
        .move_to(MovementRequest::to(Point::new(900.0, 100.0)))
        .unwrap();
    assert_eq!(first_move(&recorder.events()), Some(Point::new(40.0, 1000.0)));
}

#[test]
fn test_short_move_is_a_single_jump() {
    let (mut actuator, recorder, clock) = actuator(2);
    let report = actuator
        .move_to(MovementRequest::to(Point::new(101.0, 101.0)))
        .unwrap();

    assert_eq!(report.style, None);
    assert_eq!(recorder.events(), vec![InputEvent::MoveTo(Point::new(101.0, 101.0))]);
    assert_eq!(clock.total(), Duration::ZERO);
    // Still counts as an interaction
    assert_eq!(actuator.fatigue().interactions(), 1);
}

#[test]
fn test_duration_hint_is_honoured() {
    let (mut actuator, _recorder, clock) = actuator(3);
    let hint = Duration::from_millis(600);
    let report = actuator
        .move_to(MovementRequest::to(Point::new(1200.0, 700.0)).with_duration(hint))
        .unwrap();

    assert_eq!(report.duration, hint);
    let slept = clock.total();
    assert!(slept <= hint && slept >= hint - Duration::from_millis(5), "slept {:?}", slept);
}

#[test]
fn test_computed_duration_within_clamp() {
    let (mut actuator, _recorder, _clock) = actuator(4);
    for i in 0..50 {
        let target = Point::new(50.0 + (i * 37 % 1800) as f64, 60.0 + (i * 53 % 1000) as f64);
        let report = actuator.move_to(MovementRequest::to(target)).unwrap();
        if report.style.is_some() {
            assert!(report.duration >= Duration::from_millis(80));
            assert!(report.duration <= Duration::from_millis(1500));
        }
    }
}

#[test]
fn test_overshoot_can_be_disallowed() {
    let (mut actuator, _recorder, _clock) = actuator(5);
    for i in 0..300 {
        let x = if i % 2 == 0 { 1600.0 } else { 200.0 };
        let report = actuator
            .move_to(MovementRequest::to(Point::new(x, 500.0)).without_overshoot())
            .unwrap();
        assert_ne!(report.style, Some(MovementStyle::OvershootCorrect));
    }
}

#[test]
fn test_fatigue_counts_each_move() {
    let (mut actuator, _recorder, _clock) = actuator(6);
    for i in 0..10 {
        actuator
            .move_to(MovementRequest::to(Point::new(200.0 + i as f64 * 50.0, 300.0)))
            .unwrap();
    }
    assert_eq!(actuator.fatigue().interactions(), 10);
    assert!((actuator.fatigue().damping() - 0.03).abs() < 1e-9);
}

#[test]
fn test_thousand_clicks_only_use_primary_button() {
    let (mut actuator, recorder, _clock) = actuator(7);
    let target = Point::new(700.0, 400.0);

    for _ in 0..1000 {
        let intent = actuator.click_at(target).unwrap();
        assert_eq!(intent.button, MouseButton::Primary);
        assert!((intent.point.x - target.x).abs() <= 4.0);
        assert!((intent.point.y - target.y).abs() <= 4.0);
    }

    let events = recorder.events();
    let presses = events
        .iter()
        .filter(|e| matches!(e, InputEvent::Press(_)))
        .count();
    let releases = events
        .iter()
        .filter(|e| matches!(e, InputEvent::Release(_)))
        .count();
    assert!(presses >= 1000);
    assert_eq!(presses, releases);
    assert!(events.iter().all(|e| match e {
        InputEvent::Press(b) | InputEvent::Release(b) => *b == MouseButton::Primary,
        _ => true,
    }));
}

#[test]
fn test_click_ends_near_target() {
    let (mut actuator, recorder, _clock) = actuator(8);
    let target = Point::new(1000.0, 200.0);
    for _ in 0..50 {
        let intent = actuator.click_at(target).unwrap();
        let cursor = last_move(&recorder.events()).unwrap();
        // Offset up to 4 plus post-click drift up to 5 per axis
        assert!((cursor.x - target.x).abs() <= 9.0 + 1e-9);
        assert!((cursor.y - target.y).abs() <= 9.0 + 1e-9);
        assert!((cursor.x - intent.point.x).abs() <= 5.0 + 1e-9);
    }
}

#[test]
fn test_click_target_resolves_normalized_coordinates() {
    let (mut actuator, _recorder, _clock) = actuator(9);
    let intent = actuator
        .click_target(ScreenTarget::Normalized { x: 0.5, y: 0.5 })
        .unwrap();
    assert!((intent.point.x - 960.0).abs() <= 4.0);
    assert!((intent.point.y - 540.0).abs() <= 4.0);
}

#[test]
fn test_move_away_stays_in_safe_zone() {
    let (mut actuator, recorder, _clock) = actuator(10);
    for _ in 0..200 {
        let target = actuator.move_away_from_options().unwrap();
        assert!((384.0..=1536.0).contains(&target.x), "x={}", target.x);
        assert!((216.0..=864.0).contains(&target.y), "y={}", target.y);
        assert_eq!(last_move(&recorder.events()), Some(target));
    }
}

#[test]
fn test_reading_pause_bounds() {
    let (mut actuator, recorder, clock) = actuator(11);
    for _ in 0..100 {
        let pause = actuator
            .simulate_reading_pause(Duration::from_millis(500), Duration::from_millis(1500));
        assert!(pause >= Duration::from_millis(500) && pause <= Duration::from_millis(1500));
    }
    assert_eq!(clock.pauses().len(), 100);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_cursor_query_failure_propagates() {
    let (mut actuator, recorder, _clock) = actuator(12);
    recorder.set_failing_position(true);

    let err = actuator
        .move_to(MovementRequest::to(Point::new(500.0, 500.0)))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("cursor position"));
    assert!(actuator.click_at(Point::new(500.0, 500.0)).is_err());
    assert!(recorder.events().is_empty());
}
