//! Easing Curves
//!
//! Maps linear animation progress onto eased progress. Includes a general
//! cubic Bézier timing curve (the CSS / Android `PathInterpolator` shape)
//! used for the return-to-ground drop.

use serde::{Deserialize, Serialize};

/// Newton iterations before falling back to bisection
const NEWTON_ITERATIONS: usize = 8;
/// Bisection iterations for the fallback
const BISECTION_ITERATIONS: usize = 32;
/// Acceptable error when solving for the curve parameter
const SOLVE_EPSILON: f32 = 1e-6;

/// Cubic Bézier timing curve anchored at (0,0) and (1,1)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    /// Gentle drop: quick start, long soft landing
    pub const LIGHT_GRAVITY: Self = Self {
        x1: 0.25,
        y1: 0.1,
        x2: 0.25,
        y2: 1.0,
    };

    /// Create a curve from its two inner control points.
    ///
    /// x coordinates are clamped to `[0, 1]` so the curve stays a function
    /// of time.
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Eased output for progress `t` in `[0, 1]`
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let s = self.solve_parameter(t);
        bezier(s, self.y1, self.y2)
    }

    /// Find the curve parameter whose x coordinate equals `x`
    fn solve_parameter(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..NEWTON_ITERATIONS {
            let error = bezier(s, self.x1, self.x2) - x;
            if error.abs() < SOLVE_EPSILON {
                return s;
            }
            let slope = bezier_slope(s, self.x1, self.x2);
            if slope.abs() < SOLVE_EPSILON {
                break;
            }
            s -= error / slope;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        s = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = bezier(s, self.x1, self.x2);
            if (value - x).abs() < SOLVE_EPSILON {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        s
    }
}

/// One coordinate of the curve at parameter `s`
fn bezier(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

/// Derivative of [`bezier`] with respect to `s`
fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    Linear,

    /// Quadratic ease in
    EaseInQuad,

    /// Quadratic ease out
    EaseOutQuad,

    /// Cubic ease in and out
    EaseInOutCubic,

    /// Soft drop used for the return to the ground
    #[default]
    LightGravity,

    /// Arbitrary cubic Bézier curve
    Bezier(CubicBezier),
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::LightGravity => CubicBezier::LIGHT_GRAVITY.apply(t),
            Self::Bezier(curve) => curve.apply(t),
        }
    }
}
