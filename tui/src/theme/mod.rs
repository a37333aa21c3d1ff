//! Theme and Colors
//!
//! A ginger cat on a dark terminal.

use ratatui::style::Color;

// ============================================================================
// Pet Palette
// ============================================================================

/// Fur - warm ginger
pub const PET_FUR: Color = Color::Rgb(235, 150, 70);

/// Ears and tail tip - darker ginger
pub const PET_FUR_DARK: Color = Color::Rgb(190, 105, 45);

/// Eyes
pub const PET_EYES: Color = Color::Rgb(40, 40, 40);

/// Paws
pub const PET_PAWS: Color = Color::Rgb(255, 230, 205);

// ============================================================================
// Scene Colors
// ============================================================================

/// The ground line the pet walks on
pub const GROUND: Color = Color::Rgb(90, 110, 90);

/// Status bar text
pub const STATUS_TEXT: Color = Color::Rgb(160, 160, 170);

/// Flash shown after a tap or long press
pub const SIGNAL_FLASH: Color = Color::Rgb(255, 223, 128);
