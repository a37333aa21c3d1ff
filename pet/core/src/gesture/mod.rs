//! Gesture Interpreter
//!
//! Turns raw pointer events into pet-level signals:
//!
//! - **Drag**: once the pointer travels past the touch slop, every move
//!   produces an absolute logical position (origin + delta, y inverted).
//! - **Tap**: press and release without moving and before the long-press
//!   deadline.
//! - **Long press**: the pointer stays put until the deadline passes.
//! - **Fling**: a fast release nudges the pet by `velocity / fling_factor`.
//! - **Settle / Released**: the end of a drag, either mid-air (the pet drops
//!   back to the ground) or already on the ground.
//!
//! The interpreter is synchronous and owns no timers. The long-press timer
//! is a deadline the caller waits on and reports back through
//! [`GestureInterpreter::poll_long_press`]; cancelling it just clears the
//! deadline, so a late poll after cancel or after firing is a no-op.

mod velocity;

pub use velocity::VelocityTracker;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::geometry::Position;

/// Distance a pointer may wander before a press becomes a drag
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;
/// Hold time before a stationary press becomes a long press
pub const DEFAULT_LONG_PRESS_TIMEOUT: Duration = Duration::from_millis(500);
/// Divisor turning fling velocity (px/s) into a one-shot nudge (px)
pub const DEFAULT_FLING_FACTOR: f32 = 100.0;
/// Slowest release that still counts as a fling (px/s)
pub const DEFAULT_MIN_FLING_VELOCITY: f32 = 50.0;
/// Fastest fling honoured per axis (px/s)
pub const DEFAULT_MAX_FLING_VELOCITY: f32 = 8_000.0;

/// Raw input from the pointer source, in screen space (y grows downward)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed
    Down {
        /// Screen x
        raw_x: f32,
        /// Screen y
        raw_y: f32,
        /// When the event happened
        at: Instant,
    },
    /// Pointer moved while pressed
    Move {
        /// Screen x
        raw_x: f32,
        /// Screen y
        raw_y: f32,
        /// When the event happened
        at: Instant,
    },
    /// Pointer released
    Up {
        /// Screen x
        raw_x: f32,
        /// Screen y
        raw_y: f32,
        /// When the event happened
        at: Instant,
    },
    /// Gesture taken away by the platform
    Cancel {
        /// When the event happened
        at: Instant,
    },
    /// Fling velocity reported by the platform's own detector
    Fling {
        /// Horizontal velocity in px/s
        velocity_x: f32,
        /// Vertical velocity in px/s (screen space)
        velocity_y: f32,
    },
}

/// Interpreted output for the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureSignal {
    /// The user is dragging the pet to this position
    Drag(Position),
    /// Relative displacement from a fling
    Nudge {
        /// Horizontal delta
        dx: i32,
        /// Vertical delta (logical, up is positive)
        dy: i32,
    },
    /// Short press without movement
    Tap,
    /// Press held in place past the long-press timeout
    LongPress,
    /// Drag ended in mid-air at this position; drop back to the ground
    Settle(Position),
    /// Drag ended on (or below) the ground at this position
    Released(Position),
}

/// Gesture thresholds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureTuning {
    /// Movement (px) that turns a press into a drag
    pub touch_slop: f32,
    /// Hold time before a long press fires
    pub long_press_timeout: Duration,
    /// Velocity divisor for fling nudges
    pub fling_factor: f32,
    /// Minimum fling speed (px/s) when estimating from move samples
    pub min_fling_velocity: f32,
    /// Per-axis cap on fling speed (px/s)
    pub max_fling_velocity: f32,
    /// Estimate flings from move samples when the platform reports none
    pub estimate_fling: bool,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            touch_slop: DEFAULT_TOUCH_SLOP,
            long_press_timeout: DEFAULT_LONG_PRESS_TIMEOUT,
            fling_factor: DEFAULT_FLING_FACTOR,
            min_fling_velocity: DEFAULT_MIN_FLING_VELOCITY,
            max_fling_velocity: DEFAULT_MAX_FLING_VELOCITY,
            estimate_fling: true,
        }
    }
}

/// State of one physical touch interaction
#[derive(Debug)]
struct DragSession {
    pointer_start: (f32, f32),
    origin: Position,
    last: Position,
    moving: bool,
    long_press_fired: bool,
    flung: bool,
    long_press_deadline: Option<Instant>,
    velocity: VelocityTracker,
}

impl DragSession {
    fn release(&self) -> GestureSignal {
        if self.last.is_airborne() {
            GestureSignal::Settle(self.last)
        } else {
            GestureSignal::Released(self.last)
        }
    }
}

/// Pointer stream to gesture signal translator
#[derive(Debug)]
pub struct GestureInterpreter {
    tuning: GestureTuning,
    session: Option<DragSession>,
}

impl GestureInterpreter {
    /// Create an interpreter with the given thresholds
    #[must_use]
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            tuning,
            session: None,
        }
    }

    /// Thresholds in use
    #[must_use]
    pub fn tuning(&self) -> GestureTuning {
        self.tuning
    }

    /// Whether a pointer is currently down
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the current press has turned into a drag
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.moving)
    }

    /// When the pending long press fires, if one is armed
    #[must_use]
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.session.as_ref().and_then(|s| s.long_press_deadline)
    }

    /// Disarm the long-press timer. Safe to call at any time.
    pub fn cancel_long_press(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.long_press_deadline = None;
        }
    }

    /// Fire the long press if its deadline has passed.
    ///
    /// Returns the signal at most once per press.
    pub fn poll_long_press(&mut self, now: Instant) -> Option<GestureSignal> {
        let session = self.session.as_mut()?;
        let deadline = session.long_press_deadline?;
        if now < deadline {
            return None;
        }

        session.long_press_deadline = None;
        if session.moving || session.long_press_fired {
            return None;
        }
        session.long_press_fired = true;
        tracing::debug!(origin = %session.origin, "long press");
        Some(GestureSignal::LongPress)
    }

    /// Feed one pointer event.
    ///
    /// `current` is the pet's position right now; it becomes the drag
    /// origin on pointer-down and is ignored otherwise.
    pub fn handle(&mut self, event: PointerEvent, current: Position) -> Vec<GestureSignal> {
        match event {
            PointerEvent::Down { raw_x, raw_y, at } => {
                self.on_down(raw_x, raw_y, at, current).into_iter().collect()
            }
            PointerEvent::Move { raw_x, raw_y, at } => {
                self.on_move(raw_x, raw_y, at).into_iter().collect()
            }
            PointerEvent::Up { raw_x, raw_y, at } => self.on_up(raw_x, raw_y, at),
            PointerEvent::Cancel { .. } => self.on_cancel().into_iter().collect(),
            PointerEvent::Fling {
                velocity_x,
                velocity_y,
            } => self
                .on_fling(velocity_x, velocity_y)
                .into_iter()
                .collect(),
        }
    }

    /// A press that was never released is dropped; if it was dragging, its
    /// release is returned so control goes back to the motion machine.
    fn on_down(
        &mut self,
        raw_x: f32,
        raw_y: f32,
        at: Instant,
        current: Position,
    ) -> Option<GestureSignal> {
        let abandoned = self.session.take().and_then(|stale| {
            tracing::debug!("pointer down without release; restarting gesture");
            stale.moving.then(|| stale.release())
        });

        let mut velocity = VelocityTracker::new();
        velocity.push(at, raw_x, raw_y);

        self.session = Some(DragSession {
            pointer_start: (raw_x, raw_y),
            origin: current,
            last: current,
            moving: false,
            long_press_fired: false,
            flung: false,
            long_press_deadline: Some(at + self.tuning.long_press_timeout),
            velocity,
        });
        abandoned
    }

    fn on_move(&mut self, raw_x: f32, raw_y: f32, at: Instant) -> Option<GestureSignal> {
        let slop = self.tuning.touch_slop;
        let session = self.session.as_mut()?;
        if session.long_press_fired {
            return None;
        }

        session.velocity.push(at, raw_x, raw_y);

        let delta_x = raw_x - session.pointer_start.0;
        let inverted_delta_y = -(raw_y - session.pointer_start.1);
        session.last = session
            .origin
            .offset(delta_x as i32, inverted_delta_y as i32);

        if session.moving || delta_x.hypot(inverted_delta_y) > slop {
            if !session.moving {
                tracing::debug!(origin = %session.origin, "drag started");
            }
            session.long_press_deadline = None;
            session.moving = true;
            return Some(GestureSignal::Drag(session.last));
        }
        None
    }

    fn on_up(&mut self, raw_x: f32, raw_y: f32, at: Instant) -> Vec<GestureSignal> {
        let Some(mut session) = self.session.take() else {
            return Vec::new();
        };
        session.long_press_deadline = None;

        if !session.moving {
            return if session.long_press_fired {
                Vec::new()
            } else {
                vec![GestureSignal::Tap]
            };
        }

        let mut signals = Vec::with_capacity(2);
        if self.tuning.estimate_fling && !session.flung {
            session.velocity.push(at, raw_x, raw_y);
            let fling = session.velocity.fling_velocity(
                self.tuning.min_fling_velocity,
                self.tuning.max_fling_velocity,
            );
            if let Some((vx, vy)) = fling {
                let (dx, dy) = self.nudge_for(vx, vy);
                session.last = session.last.offset(dx, dy);
                signals.push(GestureSignal::Nudge { dx, dy });
            }
        }
        signals.push(session.release());
        tracing::debug!(at = %session.last, "drag released");
        signals
    }

    fn on_cancel(&mut self) -> Option<GestureSignal> {
        let session = self.session.take()?;
        session.moving.then(|| session.release())
    }

    fn on_fling(&mut self, velocity_x: f32, velocity_y: f32) -> Option<GestureSignal> {
        let max = self.tuning.max_fling_velocity;
        let (dx, dy) = self.nudge_for(velocity_x.clamp(-max, max), velocity_y.clamp(-max, max));
        let session = self.session.as_mut()?;
        if !session.moving || session.flung || session.long_press_fired {
            return None;
        }
        session.flung = true;
        session.last = session.last.offset(dx, dy);
        Some(GestureSignal::Nudge { dx, dy })
    }

    /// Screen-space velocity to logical nudge
    fn nudge_for(&self, velocity_x: f32, velocity_y: f32) -> (i32, i32) {
        let factor = self.tuning.fling_factor.max(f32::EPSILON);
        ((velocity_x / factor) as i32, (-velocity_y / factor) as i32)
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureTuning::default())
    }
}
