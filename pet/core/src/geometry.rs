//! Logical Coordinates and Screen Bounds
//!
//! The pet lives in a bottom-anchored coordinate space:
//!
//! ```text
//!   y = ground_y  ┌──────────────────────────────┐  ceiling
//!                 │                              │
//!                 │                              │
//!   y = 0         └──────────────┬───────────────┘  ground
//!            -half_width         0           half_width
//! ```
//!
//! Horizontal limits are symmetric around the anchor; the vertical limit is
//! single-sided. Screen space (pointer coordinates) grows downward, logical
//! space grows upward.

use serde::{Deserialize, Serialize};

/// Sprite position in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset from the bottom-center anchor
    pub x: i32,
    /// Height above the ground
    pub y: i32,
}

impl Position {
    /// Resting on the ground at the anchor
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new position
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a logical delta
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Whether the sprite is above the ground line
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        self.y > 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Raw display size reported by the overlay host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    /// Display width in physical pixels
    pub width_px: i32,
    /// Display height in physical pixels
    pub height_px: i32,
}

impl DisplayMetrics {
    /// Create display metrics
    #[must_use]
    pub const fn new(width_px: i32, height_px: i32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }
}

/// Walkable area for one animation session
///
/// Both limits are at least 1 so arithmetic on degenerate displays never
/// divides by zero or inverts a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    half_width: i32,
    ground_y: i32,
}

impl ScreenBounds {
    /// Create bounds, clamping both limits to a minimum of 1
    #[must_use]
    pub fn new(half_width: i32, ground_y: i32) -> Self {
        Self {
            half_width: half_width.max(1),
            ground_y: ground_y.max(1),
        }
    }

    /// Derive bounds from the display size and the sprite edge length.
    ///
    /// The sprite is anchored at its own bottom-center, so half of it is
    /// subtracted from each side; the top 5% of the display is kept clear
    /// for the status bar.
    #[must_use]
    pub fn from_display(metrics: DisplayMetrics, sprite_px: i32) -> Self {
        let half_width = metrics.width_px / 2 - sprite_px / 2;
        let ground_y = metrics.height_px - (metrics.height_px / 100 * 5) - sprite_px;
        Self::new(half_width, ground_y)
    }

    /// Symmetric horizontal limit
    #[must_use]
    pub const fn half_width(&self) -> i32 {
        self.half_width
    }

    /// Highest reachable height
    #[must_use]
    pub const fn ground_y(&self) -> i32 {
        self.ground_y
    }

    /// Clamp a position into `[-half_width, half_width] x [0, ground_y]`
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(-self.half_width, self.half_width),
            y: position.y.clamp(0, self.ground_y),
        }
    }

    /// Whether the position is inside the bounds
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.clamp(position) == position
    }
}
