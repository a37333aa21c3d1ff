//! Pointer Velocity Estimation
//!
//! Used when the pointer source has no fling detector of its own. Keeps a
//! short history of raw pointer samples and reports the average velocity
//! over the most recent window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Samples older than this (relative to the newest) are ignored
const HORIZON: Duration = Duration::from_millis(100);

/// Upper bound on retained samples
const MAX_SAMPLES: usize = 20;

#[derive(Clone, Copy, Debug)]
struct Sample {
    at: Instant,
    x: f32,
    y: f32,
}

/// Rolling window of pointer samples in screen space
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
}

impl VelocityTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Record a raw pointer sample
    pub fn push(&mut self, at: Instant, x: f32, y: f32) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { at, x, y });
    }

    /// Average velocity in pixels per second over the recent window
    #[must_use]
    pub fn velocity(&self) -> Option<(f32, f32)> {
        let newest = *self.samples.back()?;
        let oldest = self
            .samples
            .iter()
            .find(|s| newest.at.duration_since(s.at) <= HORIZON)?;

        let dt = newest.at.duration_since(oldest.at).as_secs_f32();
        if dt <= f32::EPSILON {
            return None;
        }
        Some(((newest.x - oldest.x) / dt, (newest.y - oldest.y) / dt))
    }

    /// Velocity qualifying as a fling: at least `min` in magnitude, each
    /// component capped at `max`
    #[must_use]
    pub fn fling_velocity(&self, min: f32, max: f32) -> Option<(f32, f32)> {
        let (vx, vy) = self.velocity()?;
        if vx.hypot(vy) < min {
            return None;
        }
        Some((vx.clamp(-max, max), vy.clamp(-max, max)))
    }
}
