//! Interpolation renderer
//!
//! Generates eased intermediate samples between the two most recent
//! keyframes so a consumer can animate at a rate decoupled from the 8 ms
//! delivery cadence (typically ~60 updates/second against a 120 ms blend
//! window).
//!
//! Elapsed time since the current keyframe was committed is normalized to
//! [0, 1] over the window, eased, and every numeric field is linearly
//! blended from the previous keyframe to the current one. The limit value is
//! never interpolated; it always comes from the target keyframe. With no
//! previous keyframe the current point passes through unmodified, flagged as
//! non-interpolated.

use ampenv_common::easing::EasingCurve;
use ampenv_common::types::DataPoint;
use std::time::{Duration, Instant};

/// One rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrame {
    pub point: DataPoint,

    /// False when the frame is a pass-through of a lone keyframe
    pub interpolated: bool,
}

/// Keyframe-pair interpolator
#[derive(Debug)]
pub struct Interpolator {
    window: Duration,
    easing: EasingCurve,
    previous: Option<DataPoint>,
    current: Option<DataPoint>,

    /// When the current keyframe was committed
    committed_at: Option<Instant>,
}

impl Interpolator {
    pub fn new(window: Duration, easing: EasingCurve) -> Self {
        Self {
            window,
            easing,
            previous: None,
            current: None,
            committed_at: None,
        }
    }

    /// Commit the next real keyframe and reset timing
    ///
    /// The old current keyframe becomes the blend source.
    pub fn commit(&mut self, point: DataPoint, now: Instant) {
        self.previous = self.current.take();
        self.current = Some(point);
        self.committed_at = Some(now);
    }

    /// Raw (un-eased) progress through the blend window, in [0, 1]
    fn raw_progress(&self, now: Instant) -> f64 {
        match self.committed_at {
            Some(committed_at) => {
                if self.window.is_zero() {
                    return 1.0;
                }
                let elapsed = now.duration_since(committed_at);
                (elapsed.as_secs_f64() / self.window.as_secs_f64()).clamp(0.0, 1.0)
            }
            None => 1.0,
        }
    }

    /// True when the current blend has finished and the next keyframe may be
    /// committed
    pub fn ready_for_next(&self, now: Instant) -> bool {
        self.current.is_none() || self.raw_progress(now) >= 1.0
    }

    /// Render the frame for time `now`
    ///
    /// `None` until the first keyframe is committed.
    pub fn frame(&self, now: Instant) -> Option<RenderFrame> {
        let current = self.current.as_ref()?;

        let previous = match &self.previous {
            Some(previous) => previous,
            None => {
                return Some(RenderFrame {
                    point: *current,
                    interpolated: false,
                })
            }
        };

        let t = self.easing.apply(self.raw_progress(now));
        Some(RenderFrame {
            point: blend(previous, current, t),
            interpolated: true,
        })
    }

    /// Drop both keyframes and timing state
    pub fn clear(&mut self) {
        self.previous = None;
        self.current = None;
        self.committed_at = None;
    }
}

/// Linear blend of every numeric field; limit taken from the target keyframe
fn blend(from: &DataPoint, to: &DataPoint, t: f64) -> DataPoint {
    let lerp = |a: f64, b: f64| a + (b - a) * t;

    DataPoint {
        current_a: lerp(from.current_a, to.current_a),
        temperature_c: lerp(from.temperature_c, to.temperature_c),
        total_loss_w: lerp(from.total_loss_w, to.total_loss_w),
        conduction_loss_w: lerp(from.conduction_loss_w, to.conduction_loss_w),
        switching_loss_w: lerp(from.switching_loss_w, to.switching_loss_w),
        progress: lerp(from.progress, to.progress).clamp(0.0, 100.0),
        limit_value: to.limit_value,
    }
}
