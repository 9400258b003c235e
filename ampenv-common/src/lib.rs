//! # ampenv shared vocabulary (ampenv-common)
//!
//! Types shared between the simulation engine and its consumers: simulation
//! parameters (with copy-with-overrides composition), streamed data points,
//! the canonical result record, easing curves for the interpolation renderer,
//! engine tuning configuration, and the workspace error type.

pub mod config;
pub mod easing;
pub mod error;
pub mod params;
pub mod types;

pub use config::EngineConfig;
pub use easing::EasingCurve;
pub use error::{Error, Result};
pub use params::{
    ConductionRating, CoolingSpec, DeviceFamily, DeviceSpec, ParameterOverrides,
    SimulationParameters,
};
pub use types::{
    DataPoint, FailureReason, RunStatus, SearchStrategy, SimulationResult, TerminationMode,
};
