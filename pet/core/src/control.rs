//! Position Authority
//!
//! Exactly one component writes the pet's position at any instant:
//!
//! - [`ControlMode::Autonomous`]: the motion state machine, once per tick.
//! - [`ControlMode::UserControlled`]: the gesture interpreter, from the first
//!   drag update until the release has been fully processed (including the
//!   return-to-ground drop).
//!
//! [`Pet`] bundles the machine, the bounds and the decision source behind
//! that switch. Writes from the side that does not hold authority are
//! rejected with [`ControlError`] instead of silently racing.

use thiserror::Error;

use crate::geometry::{Position, ScreenBounds};
use crate::motion::{Activity, DecisionSource, Facing, MotionStateMachine, MotionStep};

/// Who drives the position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// The motion state machine ticks the pet around
    #[default]
    Autonomous,
    /// The user's drag (or its release animation) owns the position
    UserControlled,
}

/// Rejected position write
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    /// A gesture-side write arrived while the pet was autonomous
    #[error("pet is not under user control")]
    NotUserControlled,
}

/// The pet: motion machine plus the single-writer switch
#[derive(Debug)]
pub struct Pet<D> {
    motion: MotionStateMachine,
    bounds: ScreenBounds,
    decisions: D,
    mode: ControlMode,
    held: Position,
}

impl<D: DecisionSource> Pet<D> {
    /// Create an autonomous pet
    pub fn new(motion: MotionStateMachine, bounds: ScreenBounds, decisions: D) -> Self {
        let held = motion.position();
        Self {
            motion,
            bounds,
            decisions,
            mode: ControlMode::Autonomous,
            held,
        }
    }

    /// Current control mode
    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Session bounds
    #[must_use]
    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    /// Authoritative position
    #[must_use]
    pub fn position(&self) -> Position {
        match self.mode {
            ControlMode::Autonomous => self.motion.position(),
            ControlMode::UserControlled => self.held,
        }
    }

    /// Current activity (frozen while user-controlled)
    #[must_use]
    pub fn activity(&self) -> Activity {
        self.motion.activity()
    }

    /// Current facing
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.motion.facing()
    }

    /// Advance the motion machine. No-op while the user holds the pet.
    pub fn tick(&mut self) -> Option<MotionStep> {
        match self.mode {
            ControlMode::Autonomous => Some(self.motion.advance(self.bounds, &mut self.decisions)),
            ControlMode::UserControlled => None,
        }
    }

    /// Take control (if needed) and move to a drag position
    pub fn drag_to(&mut self, position: Position) -> Position {
        if self.mode == ControlMode::Autonomous {
            tracing::debug!(from = %self.motion.position(), "user took control");
            self.mode = ControlMode::UserControlled;
        }
        self.held = position;
        position
    }

    /// Shift the held position by a fling delta
    pub fn nudge(&mut self, dx: i32, dy: i32) -> Result<Position, ControlError> {
        self.require_user()?;
        self.held = self.held.offset(dx, dy);
        Ok(self.held)
    }

    /// Place the held pet during its release animation
    pub fn hold_at(&mut self, position: Position) -> Result<Position, ControlError> {
        self.require_user()?;
        self.held = position;
        Ok(position)
    }

    /// Hand control back to the motion machine at `position`
    pub fn release(&mut self, position: Position) -> Result<Position, ControlError> {
        self.require_user()?;
        self.motion
            .resume(position, self.bounds, &mut self.decisions);
        self.mode = ControlMode::Autonomous;
        self.held = self.motion.position();
        tracing::debug!(at = %self.held, activity = ?self.motion.activity(), "control returned");
        Ok(self.held)
    }

    fn require_user(&self) -> Result<(), ControlError> {
        match self.mode {
            ControlMode::UserControlled => Ok(()),
            ControlMode::Autonomous => Err(ControlError::NotUserControlled),
        }
    }
}
