//! End-to-end tests for the pet session actor.
//!
//! All tests run on a paused clock, so timers fire as soon as every task is
//! idle and elapsed times are exact.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;
use tokio_test::assert_ok;

use pet_core::{
    Activity, ControlMode, DecisionSource, DisplayMetrics, Facing, OverlayHost, PetConfig,
    PetSession, PetSignal, PointerEvent, Position, Renderer, SessionHandle, SurfaceError,
};

#[derive(Default)]
struct Recording {
    attaches: u32,
    detaches: u32,
    moves: Vec<Position>,
    facings: Vec<Facing>,
}

type Shared = Arc<Mutex<Recording>>;

struct RecordingHost {
    metrics: DisplayMetrics,
    log: Shared,
}

impl OverlayHost for RecordingHost {
    fn display_metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    fn attach(&mut self) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().attaches += 1;
        Ok(())
    }

    fn move_to(&mut self, position: Position) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().moves.push(position);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().detaches += 1;
        Ok(())
    }
}

struct RecordingRenderer {
    log: Shared,
}

impl Renderer for RecordingRenderer {
    fn show_facing(&mut self, facing: Facing) {
        self.log.lock().unwrap().facings.push(facing);
    }
}

/// Always rolls 1: walls reverse, releases walk left
struct AlwaysOne;

impl DecisionSource for AlwaysOne {
    fn roll(&mut self, _faces: u32) -> u32 {
        1
    }
}

fn spawn(width: i32, height: i32) -> (SessionHandle, Shared) {
    let log = Shared::default();
    let host = RecordingHost {
        metrics: DisplayMetrics::new(width, height),
        log: Arc::clone(&log),
    };
    let renderer = RecordingRenderer {
        log: Arc::clone(&log),
    };
    let handle =
        PetSession::spawn_with_decisions(PetConfig::default(), host, renderer, AlwaysOne);
    (handle, log)
}

fn down(x: f32, y: f32) -> PointerEvent {
    PointerEvent::Down {
        raw_x: x,
        raw_y: y,
        at: Instant::now(),
    }
}

fn moved(x: f32, y: f32) -> PointerEvent {
    PointerEvent::Move {
        raw_x: x,
        raw_y: y,
        at: Instant::now(),
    }
}

fn up(x: f32, y: f32) -> PointerEvent {
    PointerEvent::Up {
        raw_x: x,
        raw_y: y,
        at: Instant::now(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_tap_is_reported() {
    let (mut handle, _log) = spawn(1080, 2340);

    assert_ok!(handle.send(down(100.0, 2000.0)).await);
    assert_ok!(handle.send(up(100.0, 2000.0)).await);

    assert_eq!(handle.next_signal().await, Some(PetSignal::Tap));
    assert_eq!(handle.snapshot().mode, ControlMode::Autonomous);
}

#[tokio::test(start_paused = true)]
async fn test_long_press_fires_once_and_suppresses_tap() {
    let (mut handle, _log) = spawn(1080, 2340);
    let pressed = Instant::now();

    assert_ok!(handle.send(down(100.0, 2000.0)).await);
    assert_eq!(handle.next_signal().await, Some(PetSignal::LongPress));
    assert!(pressed.elapsed() >= Duration::from_millis(500));

    assert_ok!(handle.send(up(100.0, 2000.0)).await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.try_signal(), None);
}

#[tokio::test(start_paused = true)]
async fn test_short_press_cancels_long_press() {
    let (mut handle, _log) = spawn(1080, 2340);

    assert_ok!(handle.send(down(100.0, 2000.0)).await);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_ok!(handle.send(up(100.0, 2000.0)).await);

    assert_eq!(handle.next_signal().await, Some(PetSignal::Tap));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.try_signal(), None);
}

#[tokio::test(start_paused = true)]
async fn test_drag_settle_and_resume() {
    let (mut handle, log) = spawn(1080, 2340);

    // Ticks at 0, 50 and 100 ms walk the pet right to x = 15.
    tokio::time::sleep(Duration::from_millis(120)).await;
    let origin = handle.snapshot().position;
    assert_eq!(origin, Position::new(15, 0));

    assert_ok!(handle.send(down(300.0, 1500.0)).await);
    assert_ok!(handle.send(moved(340.0, 1400.0)).await);
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::UserControlled))
    );

    let held = Position::new(55, 100);
    assert_eq!(handle.snapshot().position, held);
    assert_eq!(log.lock().unwrap().moves.last(), Some(&held));

    // Ticks keep firing but must not move a held pet.
    let moves_while_held = log.lock().unwrap().moves.len();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.snapshot().position, held);
    assert_eq!(handle.snapshot().mode, ControlMode::UserControlled);
    assert_eq!(log.lock().unwrap().moves.len(), moves_while_held);

    let released = Instant::now();
    assert_ok!(handle.send(up(340.0, 1400.0)).await);
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::Autonomous))
    );
    assert!(released.elapsed() >= Duration::from_millis(1_000));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.position, Position::new(55, 0));
    assert_eq!(snapshot.mode, ControlMode::Autonomous);
    assert_eq!(snapshot.activity, Activity::WalkingLeft);

    let drop_path: Vec<Position> = log.lock().unwrap().moves[moves_while_held..].to_vec();
    assert!(drop_path.len() > 2, "expected several settle frames");
    assert!(drop_path.iter().all(|p| p.x == 55));
    assert!(drop_path.windows(2).all(|w| w[1].y <= w[0].y));
    assert_eq!(drop_path.last(), Some(&Position::new(55, 0)));

    // Autonomous again: the next tick walks left.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(handle.snapshot().position.x < 55);
}

#[tokio::test(start_paused = true)]
async fn test_release_on_ground_resumes_immediately() {
    let (mut handle, _log) = spawn(1080, 2340);

    assert_ok!(handle.send(down(300.0, 1500.0)).await);
    assert_ok!(handle.send(moved(400.0, 1520.0)).await);
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::UserControlled))
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    let released = Instant::now();
    assert_ok!(handle.send(up(400.0, 1520.0)).await);
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::Autonomous))
    );
    assert!(released.elapsed() < Duration::from_millis(50));
    assert_eq!(handle.snapshot().position.y, 0);
}

#[tokio::test(start_paused = true)]
async fn test_renderer_follows_facing() {
    // half width 70: the pet reaches the right wall after 15 ticks and turns.
    let (handle, log) = spawn(200, 400);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(log.lock().unwrap().facings, vec![Facing::Right, Facing::Left]);
    assert_eq!(handle.snapshot().activity, Activity::WalkingLeft);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_detaches_once() {
    let (handle, log) = spawn(1080, 2340);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_ok!(handle.shutdown().await);

    let log = log.lock().unwrap();
    assert_eq!(log.attaches, 1);
    assert_eq!(log.detaches, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_session() {
    let (handle, log) = spawn(1080, 2340);
    let pointer = handle.pointer();
    tokio::time::sleep(Duration::from_millis(100)).await;

    drop(handle);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(log.lock().unwrap().detaches, 1);
    assert!(pointer.send(down(0.0, 0.0)).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_lost_release_hands_control_back() {
    let (mut handle, _log) = spawn(1080, 2340);

    assert_ok!(handle.send(down(300.0, 1500.0)).await);
    assert_ok!(handle.send(moved(300.0, 1400.0)).await);
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::UserControlled))
    );

    // The Up for that drag never arrives; the next press is a plain tap.
    assert_ok!(handle.send(down(300.0, 1400.0)).await);
    assert_ok!(handle.send(up(300.0, 1400.0)).await);
    assert_eq!(handle.next_signal().await, Some(PetSignal::Tap));
    assert_eq!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(ControlMode::Autonomous))
    );

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.mode, ControlMode::Autonomous);
    assert_eq!(snapshot.position.y, 0);

    // Ticks drive the pet again.
    let x = snapshot.position.x;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_ne!(handle.snapshot().position.x, x);
}
