//! Engine tuning configuration
//!
//! Delivery cadence, queue and ring capacities, interpolation window, and
//! bisection iteration budget. All knobs have documented defaults and can be
//! loaded from a TOML file; the read-frequently defaults are also available
//! through the `DEFAULTS` singleton.

use crate::easing::EasingCurve;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Shared default configuration
///
/// Initialized once, read everywhere a caller does not supply its own config.
pub static DEFAULTS: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consumer drain cadence (ms)
    ///
    /// Valid range: [1, 1000]
    /// Default: 8 ms
    /// A drain call before this interval has elapsed since the last drain
    /// is a no-op.
    pub delivery_tick_ms: u64,

    /// Maximum delivery queue length (entries)
    ///
    /// Valid range: [1, 1_000_000]
    /// Default: 1000
    /// On overflow the oldest entries are evicted; the producer never blocks.
    pub max_queue_len: usize,

    /// Display ring buffer capacity (entries)
    ///
    /// Valid range: [2, 100_000]
    /// Default: 400
    /// Oldest slot is overwritten once full.
    pub ring_capacity: usize,

    /// Interpolation window (ms)
    ///
    /// Default: 120 ms
    /// Time over which the renderer blends from the previous keyframe to
    /// the current one.
    pub interp_window_ms: u64,

    /// Bisection iteration budget
    ///
    /// Default: 15 (bounds the interval to ~0.01 A for typical devices)
    pub bisection_iters: u32,

    /// Target render update rate (Hz)
    ///
    /// Valid range: [1, 1000]
    /// Default: 60
    /// Sets the consumer's poll/render cadence; the delivery tick still
    /// bounds how often samples are handed over.
    pub render_rate_hz: u32,

    /// Easing curve applied by the interpolation renderer
    pub easing: EasingCurve,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delivery_tick_ms: 8,
            max_queue_len: 1000,
            ring_capacity: 400,
            interp_window_ms: 120,
            bisection_iters: 15,
            render_rate_hz: 60,
            easing: EasingCurve::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check knob ranges
    pub fn validate(&self) -> Result<()> {
        if self.delivery_tick_ms == 0 || self.delivery_tick_ms > 1000 {
            return Err(Error::Config(format!(
                "delivery_tick_ms out of range [1, 1000]: {}",
                self.delivery_tick_ms
            )));
        }
        if self.max_queue_len == 0 {
            return Err(Error::Config("max_queue_len must be at least 1".to_string()));
        }
        if self.ring_capacity < 2 {
            // Interpolation needs two keyframes
            return Err(Error::Config(format!(
                "ring_capacity must be at least 2: {}",
                self.ring_capacity
            )));
        }
        if self.bisection_iters == 0 {
            return Err(Error::Config("bisection_iters must be at least 1".to_string()));
        }
        if self.render_rate_hz == 0 || self.render_rate_hz > 1000 {
            return Err(Error::Config(format!(
                "render_rate_hz out of range [1, 1000]: {}",
                self.render_rate_hz
            )));
        }
        Ok(())
    }

    pub fn delivery_tick(&self) -> Duration {
        Duration::from_millis(self.delivery_tick_ms)
    }

    pub fn interp_window(&self) -> Duration {
        Duration::from_millis(self.interp_window_ms)
    }
}
