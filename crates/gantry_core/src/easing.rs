//! Easing curves for actuator motion.
//!
//! The crane accelerates out of rest and settles into rest, so every phase
//! uses a symmetric in-out curve by default.

use serde::Deserialize;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Cubic ease-in-out.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::CubicInOut => ease_in_out_cubic(t),
        }
    }
}

/// `4t^3` on the first half, `1 - (-2t + 2)^3 / 2` on the second.
#[must_use]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
