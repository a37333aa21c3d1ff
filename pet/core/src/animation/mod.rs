//! Return-to-Ground Animation
//!
//! When the user lets go of the pet in mid-air it drifts back down instead of
//! snapping. [`SettleAnimation`] is a pure function of elapsed time; the
//! session samples it once per frame and pushes each sample to the overlay
//! window.

mod timing;

pub use timing::{CubicBezier, EasingFunction};

use std::time::Duration;

use crate::geometry::Position;

/// Default drop duration
pub const DEFAULT_SETTLE_DURATION: Duration = Duration::from_millis(1_000);

/// Eased vertical drop from a release point to the ground, x held constant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettleAnimation {
    from: Position,
    duration: Duration,
    easing: EasingFunction,
}

impl SettleAnimation {
    /// Drop from `from` to the ground over `duration` with the light-gravity curve
    #[must_use]
    pub fn new(from: Position, duration: Duration) -> Self {
        Self {
            from,
            duration,
            easing: EasingFunction::LightGravity,
        }
    }

    /// Use a different easing curve
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Release point
    #[must_use]
    pub fn from(&self) -> Position {
        self.from
    }

    /// Total duration
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Final resting position
    #[must_use]
    pub fn target(&self) -> Position {
        Position::new(self.from.x, 0)
    }

    /// Linear progress in `[0, 1]` after `elapsed`
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Whether the drop has reached the ground
    #[must_use]
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Position after `elapsed`
    #[must_use]
    pub fn sample(&self, elapsed: Duration) -> Position {
        if self.is_finished(elapsed) {
            return self.target();
        }
        let eased = self.easing.apply(self.progress(elapsed));
        let start = self.from.y as f32;
        let y = (start - start * eased).round() as i32;
        Position::new(self.from.x, y.clamp(0, self.from.y.max(0)))
    }

    /// Frame-by-frame samples at `step`, ending exactly on the ground
    pub fn frames(&self, step: Duration) -> impl Iterator<Item = Position> + '_ {
        let step = step.max(Duration::from_millis(1));
        let mut elapsed = Some(Duration::ZERO);
        std::iter::from_fn(move || {
            let now = elapsed?;
            elapsed = if self.is_finished(now) {
                None
            } else {
                Some((now + step).min(self.duration))
            };
            Some(self.sample(now))
        })
    }
}
