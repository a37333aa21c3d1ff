//! The terminal surface driven by a real pet session.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ratatui::layout::Rect;
use tokio::time::Instant;
use tokio_test::assert_ok;

use pet_core::{Facing, PetConfig, PetSession, PetSignal, PointerEvent, Position};
use pet_tui::sprites::{SPRITE_COLS, SPRITE_ROWS};
use pet_tui::surface::{SharedScene, TerminalGeometry, TerminalHost, TerminalRenderer};

fn start(geometry: TerminalGeometry) -> (pet_core::SessionHandle, SharedScene) {
    let scene = SharedScene::default();
    let host = TerminalHost::new(Arc::clone(&scene), geometry.display_metrics());
    let renderer = TerminalRenderer::new(Arc::clone(&scene));
    let mut config = PetConfig::default();
    config.sprite_size_dp = 60;
    config.density = 1.0;
    (PetSession::spawn(config, host, renderer), scene)
}

#[tokio::test(start_paused = true)]
async fn test_scene_follows_the_walking_pet() {
    let geometry = TerminalGeometry::new(80, 40, SPRITE_COLS, SPRITE_ROWS);
    let (handle, scene) = start(geometry);

    tokio::time::sleep(Duration::from_millis(120)).await;
    let shown = *scene.lock();
    assert!(shown.attached);
    assert_eq!(shown.position, Position::new(15, 0));
    assert_eq!(shown.facing, Facing::Right);
    assert_eq!(geometry.sprite_rect(shown.position), Rect::new(38, 37, 6, 3));

    assert_ok!(handle.shutdown().await);
    assert!(!scene.lock().attached);
}

#[tokio::test(start_paused = true)]
async fn test_click_on_sprite_is_a_tap() {
    let geometry = TerminalGeometry::new(80, 40, SPRITE_COLS, SPRITE_ROWS);
    let (mut handle, scene) = start(geometry);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let rect = geometry.sprite_rect(scene.lock().position);
    let (raw_x, raw_y) = geometry.cell_to_raw(rect.x + 2, rect.y + 1);
    let at = Instant::now();

    assert_ok!(handle.send(PointerEvent::Down { raw_x, raw_y, at }).await);
    assert_ok!(handle.send(PointerEvent::Up { raw_x, raw_y, at }).await);
    assert_eq!(handle.next_signal().await, Some(PetSignal::Tap));
}

#[tokio::test(start_paused = true)]
async fn test_dragging_lifts_the_sprite() {
    let geometry = TerminalGeometry::new(80, 40, SPRITE_COLS, SPRITE_ROWS);
    let (mut handle, scene) = start(geometry);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let before = geometry.sprite_rect(scene.lock().position);
    let (raw_x, raw_y) = geometry.cell_to_raw(before.x + 2, before.y + 1);
    let (_, lifted_y) = geometry.cell_to_raw(before.x + 2, before.y + 1 - 10);

    let at = Instant::now();
    assert_ok!(handle.send(PointerEvent::Down { raw_x, raw_y, at }).await);
    assert_ok!(
        handle
            .send(PointerEvent::Move {
                raw_x,
                raw_y: lifted_y,
                at
            })
            .await
    );
    assert!(matches!(
        handle.next_signal().await,
        Some(PetSignal::ControlChanged(_))
    ));

    let after = geometry.sprite_rect(scene.lock().position);
    assert_eq!(after.x, before.x);
    assert_eq!(after.y, before.y - 10);
}
