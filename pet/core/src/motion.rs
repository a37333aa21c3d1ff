//! Motion State Machine
//!
//! Drives the pet autonomously, one discrete tick at a time. The machine
//! owns the logical position, the current [`Activity`] and the visual
//! [`Facing`]; it never looks at the clock; the session decides when to
//! call [`MotionStateMachine::advance`].
//!
//! # Activities
//!
//! ```text
//!              edge (even)                   top reached
//!  Walking ─────────────────► Falling ─────────────────► jump decision
//!     ▲  │ edge (odd): reverse   ▲                           │  │  │
//!     │  └──────────┐            │ bound + top               │  │  └─► Rising
//!     │             ▼            │                           │  │        │
//!     │          Walking      Jumping ◄──────────────────────┘  │        │
//!     │          (other)         ▲  opposite side (even)         │        │
//!     │                          └───────────────────────────────┘        │
//!     │                             same side (odd, /3)                   │
//!     └───────────────────────────── landed (y <= 0) ─────────────────────┘
//! ```
//!
//! `Falling` carries the sprite upward toward the ceiling and `Rising` brings
//! it back down to the ground; the names follow the overlay window's
//! bottom-gravity convention, where the window "falls" away from the bottom
//! edge.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geometry::{Position, ScreenBounds};

/// Horizontal walking speed per tick
pub const DEFAULT_WALK_SPEED: i32 = 5;
/// Ground-seeking descent speed per tick
pub const DEFAULT_FALL_SPEED: i32 = 20;
/// Horizontal speed while jumping or climbing
pub const DEFAULT_JUMP_X_SPEED: i32 = 10;
/// Vertical speed while jumping or climbing
pub const DEFAULT_JUMP_Y_SPEED: i32 = 5;

/// Faces of the edge-of-width die
const EDGE_ROLL: u32 = 10;
/// Faces of the jump-event die
const JUMP_ROLL: u32 = 15;

/// Visual orientation of the sprite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Looking toward negative x
    Left,
    /// Looking toward positive x
    #[default]
    Right,
}

impl Facing {
    /// The other side
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step along x
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// What the pet is doing this tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Walking along the ground toward positive x
    #[default]
    WalkingRight,
    /// Walking along the ground toward negative x
    WalkingLeft,
    /// Climbing toward the ceiling, drifting toward the faced side
    Falling,
    /// Ground-seeking descent
    Rising,
    /// Diagonal leap toward positive x
    JumpingRight,
    /// Diagonal leap toward negative x
    JumpingLeft,
}

impl Activity {
    /// Walking activity for a direction
    #[must_use]
    pub const fn walking(direction: Facing) -> Self {
        match direction {
            Facing::Left => Self::WalkingLeft,
            Facing::Right => Self::WalkingRight,
        }
    }

    /// Jumping activity for a direction
    #[must_use]
    pub const fn jumping(direction: Facing) -> Self {
        match direction {
            Facing::Left => Self::JumpingLeft,
            Facing::Right => Self::JumpingRight,
        }
    }

    /// Horizontal direction implied by the activity, if any
    #[must_use]
    pub const fn direction(self) -> Option<Facing> {
        match self {
            Self::WalkingLeft | Self::JumpingLeft => Some(Facing::Left),
            Self::WalkingRight | Self::JumpingRight => Some(Facing::Right),
            Self::Falling | Self::Rising => None,
        }
    }
}

/// Per-tick speeds in logical pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionTuning {
    /// Horizontal step while walking
    pub walk_speed: i32,
    /// Vertical step while descending
    pub fall_speed: i32,
    /// Horizontal step while jumping or climbing
    pub jump_x_speed: i32,
    /// Vertical step while jumping or climbing
    pub jump_y_speed: i32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            walk_speed: DEFAULT_WALK_SPEED,
            fall_speed: DEFAULT_FALL_SPEED,
            jump_x_speed: DEFAULT_JUMP_X_SPEED,
            jump_y_speed: DEFAULT_JUMP_Y_SPEED,
        }
    }
}

/// Source of the uniform rolls behind the random decisions
pub trait DecisionSource {
    /// Roll a die with faces `1..=faces`
    fn roll(&mut self, faces: u32) -> u32;
}

/// [`DecisionSource`] backed by a seedable PRNG
#[derive(Clone, Debug)]
pub struct RandomDecisions {
    rng: StdRng,
}

impl RandomDecisions {
    /// Seed from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for simulations
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, entropy otherwise
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl DecisionSource for RandomDecisions {
    fn roll(&mut self, faces: u32) -> u32 {
        self.rng.gen_range(1..=faces.max(1))
    }
}

/// Outcome of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionStep {
    /// Position after the tick
    pub position: Position,
    /// Activity for the next tick
    pub activity: Activity,
    /// Facing after the tick
    pub facing: Facing,
    /// Whether the activity changed during this tick
    pub transitioned: bool,
}

/// The autonomous walk/climb/jump/descend machine
#[derive(Clone, Debug)]
pub struct MotionStateMachine {
    position: Position,
    activity: Activity,
    facing: Facing,
    tuning: MotionTuning,
}

impl MotionStateMachine {
    /// Start on the ground at the anchor, walking right
    #[must_use]
    pub fn new(tuning: MotionTuning) -> Self {
        Self::with_state(tuning, Position::ORIGIN, Activity::WalkingRight)
    }

    /// Start from an explicit position and activity
    #[must_use]
    pub fn with_state(tuning: MotionTuning, position: Position, activity: Activity) -> Self {
        Self {
            position,
            activity,
            facing: activity.direction().unwrap_or_default(),
            tuning,
        }
    }

    /// Current logical position
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current activity
    #[must_use]
    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// Current facing
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Speeds in use
    #[must_use]
    pub fn tuning(&self) -> MotionTuning {
        self.tuning
    }

    /// Take back control after a drag.
    ///
    /// The position is clamped into `bounds` and a fresh walking direction
    /// is chosen uniformly.
    pub fn resume<D>(&mut self, position: Position, bounds: ScreenBounds, decisions: &mut D)
    where
        D: DecisionSource + ?Sized,
    {
        let direction = if decisions.roll(2) == 1 {
            Facing::Left
        } else {
            Facing::Right
        };
        self.position = bounds.clamp(position);
        self.activity = Activity::walking(direction);
        self.facing = direction;
        tracing::debug!(position = %self.position, activity = ?self.activity, "motion resumed");
    }

    /// Advance one tick.
    pub fn advance<D>(&mut self, bounds: ScreenBounds, decisions: &mut D) -> MotionStep
    where
        D: DecisionSource + ?Sized,
    {
        let half_width = bounds.half_width();
        let ceiling = bounds.ground_y();
        let before = self.activity;
        let Position { mut x, mut y } = self.position;

        match self.activity {
            Activity::Rising => {
                if y <= 0 {
                    y = 0;
                    self.activity = if x == half_width {
                        Activity::WalkingLeft
                    } else {
                        Activity::WalkingRight
                    };
                } else {
                    y = (y - self.tuning.fall_speed).max(0);
                }
            }

            Activity::WalkingRight | Activity::WalkingLeft => {
                let direction = self.activity.direction().unwrap_or_default();
                if at_bound(x, direction, half_width) {
                    x = direction.sign() * half_width;
                    self.activity = self.edge_decision(direction, decisions);
                } else {
                    x += direction.sign() * self.tuning.walk_speed;
                    self.facing = direction;
                }
            }

            Activity::Falling => {
                if y >= ceiling {
                    y = ceiling;
                    self.activity = self.jump_decision(decisions);
                } else {
                    x = step_toward(x, self.facing, self.tuning.jump_x_speed, half_width);
                    y = (y + self.tuning.jump_y_speed).min(ceiling);
                }
            }

            Activity::JumpingRight | Activity::JumpingLeft => {
                let direction = self.activity.direction().unwrap_or_default();
                self.facing = direction;
                if !at_bound(x, direction, half_width) {
                    x = step_toward(x, direction, self.tuning.jump_x_speed, half_width);
                    y = (y + self.tuning.jump_y_speed).min(ceiling);
                } else if y >= ceiling {
                    y = ceiling;
                    self.activity = Activity::Falling;
                } else {
                    y = (y + self.tuning.jump_y_speed).min(ceiling);
                    self.activity = self.jump_decision(decisions);
                }
            }
        }

        self.position = Position::new(x, y.clamp(0, ceiling));

        let transitioned = before != self.activity;
        if transitioned {
            tracing::debug!(
                from = ?before,
                to = ?self.activity,
                position = %self.position,
                "activity transition"
            );
        }

        MotionStep {
            position: self.position,
            activity: self.activity,
            facing: self.facing,
            transitioned,
        }
    }

    /// At a side wall: climb half the time, otherwise turn around
    fn edge_decision<D>(&self, walking: Facing, decisions: &mut D) -> Activity
    where
        D: DecisionSource + ?Sized,
    {
        if decisions.roll(EDGE_ROLL) % 2 == 0 {
            Activity::Falling
        } else {
            Activity::walking(walking.opposite())
        }
    }

    /// At the ceiling: leap away, leap along, or come down
    fn jump_decision<D>(&self, decisions: &mut D) -> Activity
    where
        D: DecisionSource + ?Sized,
    {
        let roll = decisions.roll(JUMP_ROLL);
        if roll % 2 == 0 {
            Activity::jumping(self.facing.opposite())
        } else if roll % 3 == 0 {
            Activity::jumping(self.facing)
        } else {
            Activity::Rising
        }
    }
}

impl Default for MotionStateMachine {
    fn default() -> Self {
        Self::new(MotionTuning::default())
    }
}

fn at_bound(x: i32, direction: Facing, half_width: i32) -> bool {
    match direction {
        Facing::Right => x >= half_width,
        Facing::Left => x <= -half_width,
    }
}

fn step_toward(x: i32, direction: Facing, speed: i32, half_width: i32) -> i32 {
    match direction {
        Facing::Right => (x + speed).min(half_width),
        Facing::Left => (x - speed).max(-half_width),
    }
}
