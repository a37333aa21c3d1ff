//! Pet TUI - a desktop pet for your terminal
//!
//! Hosts a `pet_core` session in a full-screen terminal: the pet walks along
//! the bottom row, climbs the sides and crawls along the top. Grab it with
//! the mouse to drag it around; let go in mid-air and it drifts back down.
//!
//! # Architecture
//!
//! - **Surface**: terminal stand-in for the overlay window (cell/pixel mapping)
//! - **Sprites**: blocky pixel art, two-frame walk cycle per facing
//! - **App**: event loop turning mouse input into pointer events

pub mod app;
pub mod sprites;
pub mod surface;
pub mod theme;

pub use app::App;
