//! Pet Core - Motion and Gesture Engine for a Desktop Pet Overlay
//!
//! A small sprite lives in a system-wide overlay window. On its own it walks
//! along the bottom of the screen, climbs the side walls, crawls along the
//! ceiling and drops back down. The user can grab it, drag it anywhere and
//! fling it; when let go in mid-air it drifts back to the ground.
//!
//! This crate holds all of that behavior and none of the platform. Window
//! placement and sprite artwork are reached through the [`OverlayHost`] and
//! [`Renderer`] traits; pointer input arrives as [`PointerEvent`] values.
//!
//! # Architecture
//!
//! ```text
//!   pointer events ──► GestureInterpreter ──┐
//!                                           │  GestureSignal
//!                                           ▼
//!   tick (50 ms) ───────────────────────►  Pet  ◄── ControlMode
//!                                           │     (Autonomous | UserControlled)
//!                                           │  Position / Facing
//!                                           ▼
//!                          OverlayWindow<OverlayHost> + Renderer
//! ```
//!
//! [`PetSession`] owns every box in that diagram inside one tokio task.
//!
//! # Key Types
//!
//! - [`MotionStateMachine`]: the six-activity walk/climb/jump/descend machine
//! - [`GestureInterpreter`]: drag, tap, long press and fling detection
//! - [`Pet`]: single-writer switch between the two
//! - [`SettleAnimation`]: eased return-to-ground drop
//! - [`PetSession`] / [`SessionHandle`]: the runtime and its host-side handle
//! - [`PetConfig`]: TOML/env/CLI configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use pet_core::{load_config, PetSession, PointerEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let mut handle = PetSession::spawn(config, my_host, my_renderer);
//!
//!     handle.send(PointerEvent::Down { raw_x: 10.0, raw_y: 900.0, at: tokio::time::Instant::now() }).await?;
//!     while let Some(signal) = handle.next_signal().await {
//!         println!("{signal:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No Platform Dependencies
//!
//! Nothing here links against a window system or a terminal library.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod config;
pub mod control;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod motion;
pub mod session;

pub use animation::{CubicBezier, EasingFunction, SettleAnimation};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, PetConfig, PetToml,
};
pub use control::{ControlError, ControlMode, Pet};
pub use geometry::{DisplayMetrics, Position, ScreenBounds};
pub use gesture::{GestureInterpreter, GestureSignal, GestureTuning, PointerEvent, VelocityTracker};
pub use host::{OverlayHost, OverlayWindow, Renderer, SurfaceError, WindowState};
pub use motion::{
    Activity, DecisionSource, Facing, MotionStateMachine, MotionStep, MotionTuning,
    RandomDecisions,
};
pub use session::{PetSession, PetSignal, PetSnapshot, PointerSender, SessionError, SessionHandle};
