//! Easing curve implementations for sample interpolation
//!
//! The interpolation renderer blends between the two most recent delivered
//! samples over a fixed time window; these curves shape that blend.
//!
//! Each curve maps a normalized position t ∈ [0, 1] to an eased progress
//! value in [0, 1], with f(0) = 0 and f(1) = 1.

use serde::{Deserialize, Serialize};

/// Easing curve types for keyframe interpolation
///
/// - Linear: constant rate of change
/// - QuadIn: slow start, fast finish (t²)
/// - QuadOut: fast start, slow finish (1 - (1-t)²)
/// - QuadInOut: smooth acceleration and deceleration (default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingCurve {
    /// f(t) = t
    Linear,

    /// f(t) = t²
    QuadIn,

    /// f(t) = 1 - (1-t)²
    QuadOut,

    /// f(t) = 2t² for t < 0.5, 1 - 2(1-t)² otherwise
    QuadInOut,
}

impl EasingCurve {
    /// Apply the curve at normalized position `t`
    ///
    /// Input is clamped to [0, 1]; output is always in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingCurve::Linear => t,
            EasingCurve::QuadIn => t * t,
            EasingCurve::QuadOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            EasingCurve::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let inv = 1.0 - t;
                    1.0 - 2.0 * inv * inv
                }
            }
        }
    }

    /// Parse curve from string (config files)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(EasingCurve::Linear),
            "quad_in" | "quadin" | "ease-in" => Some(EasingCurve::QuadIn),
            "quad_out" | "quadout" | "ease-out" => Some(EasingCurve::QuadOut),
            "quad_in_out" | "quadinout" | "ease-in-out" => Some(EasingCurve::QuadInOut),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EasingCurve::Linear => "Linear",
            EasingCurve::QuadIn => "Quadratic Ease-In",
            EasingCurve::QuadOut => "Quadratic Ease-Out",
            EasingCurve::QuadInOut => "Quadratic Ease-In-Out",
        }
    }

    pub fn all_variants() -> &'static [EasingCurve] {
        &[
            EasingCurve::Linear,
            EasingCurve::QuadIn,
            EasingCurve::QuadOut,
            EasingCurve::QuadInOut,
        ]
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::QuadInOut
    }
}

impl std::fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
