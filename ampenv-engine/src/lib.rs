//! # ampenv simulation engine (ampenv-engine)
//!
//! Models the safe operating envelope of a power-switching device under a
//! chosen cooling solution: the loss/temperature model, the linear-sweep and
//! bisection search drivers that probe it, and the real-time delivery
//! pipeline (producer worker → bounded delivery queue → display ring buffer
//! → interpolation renderer) that streams intermediate samples to a consumer
//! at a fixed cadence while staying responsive to cancellation.
//!
//! **Architecture:** producer and consumer share only the bounded delivery
//! queue; the consumer polls at the delivery tick and renders interpolated
//! frames at its own rate.

pub mod delivery;
pub mod display;
pub mod engine;
pub mod finalize;
pub mod interp;
pub mod model;
pub mod producer;
pub mod search;

pub use engine::{Engine, RunHandle};
pub use interp::RenderFrame;
pub use search::SearchOutcome;

// Re-export the shared vocabulary so consumers need only this crate
pub use ampenv_common::{
    ConductionRating, CoolingSpec, DataPoint, DeviceFamily, DeviceSpec, EasingCurve,
    EngineConfig, Error, FailureReason, ParameterOverrides, Result, RunStatus, SearchStrategy,
    SimulationParameters, SimulationResult, TerminationMode,
};
