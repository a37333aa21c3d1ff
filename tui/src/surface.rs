//! Terminal Overlay Surface
//!
//! Stands in for the system overlay window: the session moves a window
//! around, and the app draws whatever the window last showed. Both sides
//! share one [`Scene`].
//!
//! Terminal cells are mapped to "pixels" at a fixed 10x20 ratio so the pet's
//! pixel-based speeds look about right on a typical terminal font.

use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::layout::Rect;

use pet_core::{DisplayMetrics, Facing, OverlayHost, Position, Renderer, SurfaceError};

/// Pixels per terminal column
pub const CELL_WIDTH_PX: i32 = 10;

/// Pixels per terminal row
pub const CELL_HEIGHT_PX: i32 = 20;

/// What the overlay window currently shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Whether the window is on screen
    pub attached: bool,
    /// Last position the session moved the window to
    pub position: Position,
    /// Artwork facing
    pub facing: Facing,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            attached: false,
            position: Position::ORIGIN,
            facing: Facing::Right,
        }
    }
}

/// Scene shared between the session task and the render loop
pub type SharedScene = Arc<Mutex<Scene>>;

/// Maps between terminal cells and the pet's pixel space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalGeometry {
    cols: u16,
    rows: u16,
    sprite_cols: u16,
    sprite_rows: u16,
}

impl TerminalGeometry {
    /// Geometry for a `cols` x `rows` terminal and a sprite box
    pub fn new(cols: u16, rows: u16, sprite_cols: u16, sprite_rows: u16) -> Self {
        Self {
            cols,
            rows,
            sprite_cols,
            sprite_rows,
        }
    }

    /// Terminal size in pixel space
    pub fn display_metrics(&self) -> DisplayMetrics {
        DisplayMetrics::new(
            i32::from(self.cols) * CELL_WIDTH_PX,
            i32::from(self.rows) * CELL_HEIGHT_PX,
        )
    }

    /// Sprite edge in pixels (the session treats the sprite as square)
    pub fn sprite_px(&self) -> i32 {
        i32::from(self.sprite_cols) * CELL_WIDTH_PX
    }

    /// Cells covered by the sprite at a logical position
    ///
    /// x is an offset from the bottom-center anchor; y is height above the
    /// bottom edge of the screen.
    pub fn sprite_rect(&self, position: Position) -> Rect {
        let metrics = self.display_metrics();
        let left_px = metrics.width_px / 2 + position.x - self.sprite_px() / 2;
        let bottom_px = metrics.height_px - position.y;

        let col = (left_px / CELL_WIDTH_PX).clamp(0, i32::from(self.cols));
        let bottom_row = (bottom_px / CELL_HEIGHT_PX).clamp(0, i32::from(self.rows));
        let top_row = (bottom_row - i32::from(self.sprite_rows)).max(0);

        Rect::new(
            u16::try_from(col).unwrap_or(0),
            u16::try_from(top_row).unwrap_or(0),
            self.sprite_cols,
            self.sprite_rows,
        )
    }

    /// Center of a terminal cell in screen pixels (y grows downward)
    pub fn cell_to_raw(&self, col: u16, row: u16) -> (f32, f32) {
        (
            f32::from(col) * CELL_WIDTH_PX as f32 + CELL_WIDTH_PX as f32 / 2.0,
            f32::from(row) * CELL_HEIGHT_PX as f32 + CELL_HEIGHT_PX as f32 / 2.0,
        )
    }
}

/// [`OverlayHost`] that records the window position into the scene
#[derive(Debug)]
pub struct TerminalHost {
    scene: SharedScene,
    metrics: DisplayMetrics,
}

impl TerminalHost {
    /// Host writing into `scene`
    pub fn new(scene: SharedScene, metrics: DisplayMetrics) -> Self {
        Self { scene, metrics }
    }
}

impl OverlayHost for TerminalHost {
    fn display_metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    fn attach(&mut self) -> Result<(), SurfaceError> {
        self.scene.lock().attached = true;
        Ok(())
    }

    fn move_to(&mut self, position: Position) -> Result<(), SurfaceError> {
        let mut scene = self.scene.lock();
        if !scene.attached {
            return Err(SurfaceError::NotAttached);
        }
        scene.position = position;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), SurfaceError> {
        self.scene.lock().attached = false;
        Ok(())
    }
}

/// [`Renderer`] that records the facing into the scene
#[derive(Debug)]
pub struct TerminalRenderer {
    scene: SharedScene,
}

impl TerminalRenderer {
    /// Renderer writing into `scene`
    pub fn new(scene: SharedScene) -> Self {
        Self { scene }
    }
}

impl Renderer for TerminalRenderer {
    fn show_facing(&mut self, facing: Facing) {
        self.scene.lock().facing = facing;
    }
}
