//! Sprite Definitions
//!
//! Blocky pixel art using Unicode block elements and colors. The pet is
//! drawn facing right; left-facing frames are mirrored at load time.

use std::collections::HashMap;

use ratatui::style::Color;

use pet_core::Facing;

use crate::theme::{PET_EYES, PET_FUR, PET_FUR_DARK, PET_PAWS};

/// Sprite width in terminal cells
pub const SPRITE_COLS: u16 = 6;

/// Sprite height in terminal cells
pub const SPRITE_ROWS: u16 = 3;

/// A single colored cell in a sprite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColoredCell {
    /// The character to display
    pub ch: char,
    /// Foreground color
    pub fg: Color,
}

impl ColoredCell {
    /// Create a new colored cell
    pub const fn new(ch: char, fg: Color) -> Self {
        Self { ch, fg }
    }

    /// Empty/transparent cell
    pub const fn empty() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }

    /// Check if cell is empty/transparent
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
    }
}

/// One frame of the pet, row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    cells: Vec<Vec<ColoredCell>>,
}

impl Frame {
    /// Get cell at position (empty if out of bounds)
    pub fn get(&self, x: u16, y: u16) -> ColoredCell {
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or_else(ColoredCell::empty)
    }

    /// Same frame, flipped horizontally
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let width = self.cells.iter().map(Vec::len).max().unwrap_or(0);
        let cells = self
            .cells
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, ColoredCell::empty());
                row.reverse();
                row
            })
            .collect();
        Self { cells }
    }
}

/// Parse a sprite pattern using a palette
///
/// Each character in the pattern maps to a `(char, Color)` in the palette.
/// Space is always transparent; unknown characters are shown as-is.
pub fn build_frame(pattern: &[&str], palette: &[(char, char, Color)]) -> Frame {
    let color_map: HashMap<char, (char, Color)> = palette
        .iter()
        .map(|&(key, ch, color)| (key, (ch, color)))
        .collect();

    let cells = pattern
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| match color_map.get(&c) {
                    _ if c == ' ' => ColoredCell::empty(),
                    Some(&(ch, color)) => ColoredCell::new(ch, color),
                    None => ColoredCell::new(c, Color::Reset),
                })
                .collect()
        })
        .collect();

    Frame { cells }
}

const PALETTE: &[(char, char, Color)] = &[
    ('E', '▲', PET_FUR_DARK),
    ('B', '█', PET_FUR),
    ('e', '▪', PET_EYES),
    ('T', '~', PET_FUR_DARK),
    ('P', '┃', PET_PAWS),
];

const STRIDE_A: [&str; 3] = ["   E E", "TBBBeB", " P  P "];
const STRIDE_B: [&str; 3] = ["   E E", "TBBBeB", "P  P  "];

/// Two-frame walk cycle in both facings
#[derive(Clone, Debug)]
pub struct SpriteSheet {
    right: [Frame; 2],
    left: [Frame; 2],
}

impl SpriteSheet {
    /// Build the pet sprites
    pub fn new() -> Self {
        let right = [build_frame(&STRIDE_A, PALETTE), build_frame(&STRIDE_B, PALETTE)];
        let left = [right[0].mirrored(), right[1].mirrored()];
        Self { right, left }
    }

    /// Frame for `facing` at animation step `step`
    pub fn frame(&self, facing: Facing, step: u64) -> &Frame {
        let frames = match facing {
            Facing::Right => &self.right,
            Facing::Left => &self.left,
        };
        &frames[(step % 2) as usize]
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_fit_sprite_box() {
        for pattern in [STRIDE_A, STRIDE_B] {
            assert_eq!(pattern.len(), SPRITE_ROWS as usize);
            assert!(pattern.iter().all(|row| row.chars().count() == SPRITE_COLS as usize));
        }
    }

    #[test]
    fn test_left_is_mirror_of_right() {
        let sheet = SpriteSheet::new();
        let right = sheet.frame(Facing::Right, 0);
        let left = sheet.frame(Facing::Left, 0);

        // Eye sits near the front of the head.
        assert_eq!(right.get(4, 1).ch, '▪');
        assert_eq!(left.get(1, 1).ch, '▪');
        assert_eq!(right.get(0, 1).ch, '~');
        assert_eq!(left.get(5, 1).ch, '~');
    }

    #[test]
    fn test_walk_cycle_alternates() {
        let sheet = SpriteSheet::new();
        assert_ne!(sheet.frame(Facing::Right, 0), sheet.frame(Facing::Right, 1));
        assert_eq!(sheet.frame(Facing::Right, 0), sheet.frame(Facing::Right, 2));
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let sheet = SpriteSheet::new();
        assert!(sheet.frame(Facing::Left, 0).get(40, 40).is_empty());
    }
}
