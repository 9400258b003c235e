//! Simulation parameters: device ratings, environment, cooling solution
//!
//! `SimulationParameters` is the immutable per-run input to the engine. It is
//! validated synchronously before any worker is spawned, and composed for
//! what-if exploration via `ParameterOverrides` (copy-with-overrides, never
//! in-place mutation).
//!
//! # Units
//!
//! Amperes, volts, watts, seconds, hertz, °C, and °C/W throughout. Field
//! names carry unit suffixes so call sites stay unambiguous.

use crate::error::{Error, Result};
use crate::types::{SearchStrategy, TerminationMode};
use serde::{Deserialize, Serialize};

/// Default number of steps for the linear sweep strategy
pub const DEFAULT_SWEEP_STEPS: u32 = 100;

/// Device family, selecting the conduction loss model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFamily {
    /// Resistive channel: conduction loss scales with I² × Rds(on)
    Mosfet,

    /// Saturating junction: conduction loss scales with I × Vce(sat)
    Igbt,
}

impl DeviceFamily {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mosfet" | "fet" => Some(DeviceFamily::Mosfet),
            "igbt" | "bjt" => Some(DeviceFamily::Igbt),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceFamily::Mosfet => "MOSFET",
            DeviceFamily::Igbt => "IGBT",
        }
    }
}

impl std::fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Conduction rating: on-resistance XOR saturation voltage
///
/// Encoded as an enum so a device can never carry both (or neither) value.
/// Validation still checks that the variant agrees with the declared family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductionRating {
    /// Rds(on) in ohms (MOSFET)
    OnResistance(f64),

    /// Vce(sat) in volts (IGBT)
    SaturationVoltage(f64),
}

impl ConductionRating {
    /// The raw rating value, regardless of variant
    pub fn value(&self) -> f64 {
        match self {
            ConductionRating::OnResistance(r) => *r,
            ConductionRating::SaturationVoltage(v) => *v,
        }
    }

    /// True when the variant matches the device family's loss model
    pub fn matches_family(&self, family: DeviceFamily) -> bool {
        matches!(
            (self, family),
            (ConductionRating::OnResistance(_), DeviceFamily::Mosfet)
                | (ConductionRating::SaturationVoltage(_), DeviceFamily::Igbt)
        )
    }
}

/// Electrical and thermal ratings of the switching device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Manufacturer part number (labeling only, not used by the model)
    #[serde(default)]
    pub part_number: String,

    /// Device family, selecting the conduction loss model
    pub family: DeviceFamily,

    /// Maximum continuous current rating (A)
    pub max_current_a: f64,

    /// Maximum drain-source / collector-emitter voltage (V)
    pub max_voltage_v: f64,

    /// Maximum power dissipation rating (W), if the datasheet provides one
    #[serde(default)]
    pub max_power_w: Option<f64>,

    /// On-resistance or saturation voltage, per family
    pub conduction: ConductionRating,

    /// Switching rise time (s)
    pub rise_time_s: f64,

    /// Switching fall time (s)
    pub fall_time_s: f64,

    /// Junction-to-case thermal resistance (°C/W)
    pub thermal_resistance_c_per_w: f64,

    /// Maximum junction temperature (°C)
    pub max_junction_temp_c: f64,
}

/// Cooling solution attached to the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolingSpec {
    /// Descriptive name (labeling only)
    #[serde(default)]
    pub name: String,

    /// Case-to-ambient thermal resistance of the cooling solution (°C/W)
    pub thermal_resistance_c_per_w: f64,

    /// Nominal dissipation budget the solution is rated to remove (W)
    pub rated_dissipation_w: f64,

    /// User override of the budget, honored only in budget-limit mode (W)
    #[serde(default)]
    pub budget_override_w: Option<f64>,
}

/// Complete, immutable input for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub device: DeviceSpec,
    pub cooling: CoolingSpec,

    /// Ambient temperature (°C). May exceed the junction limit; the run then
    /// reports failure at zero current rather than rejecting the input.
    pub ambient_temp_c: f64,

    /// Switching frequency (Hz)
    pub switching_freq_hz: f64,

    /// Which limit terminates the search
    #[serde(default)]
    pub termination: TerminationMode,

    /// Search strategy
    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Linear sweep precision (number of equal current increments)
    #[serde(default = "default_sweep_steps")]
    pub sweep_steps: u32,
}

fn default_sweep_steps() -> u32 {
    DEFAULT_SWEEP_STEPS
}

impl SimulationParameters {
    /// Validate numeric sanity of all fields
    ///
    /// All ratings must be strictly positive and finite; optional fields may
    /// be absent but must be positive when present; the conduction rating
    /// must match the declared device family. Rejection happens here, before
    /// any producer is spawned.
    pub fn validate(&self) -> Result<()> {
        let d = &self.device;

        require_positive("device.max_current_a", d.max_current_a)?;
        require_positive("device.max_voltage_v", d.max_voltage_v)?;
        require_positive("device.rise_time_s", d.rise_time_s)?;
        require_positive("device.fall_time_s", d.fall_time_s)?;
        require_positive("device.thermal_resistance_c_per_w", d.thermal_resistance_c_per_w)?;
        require_positive("device.max_junction_temp_c", d.max_junction_temp_c)?;
        require_positive("device.conduction", d.conduction.value())?;

        if let Some(p) = d.max_power_w {
            require_positive("device.max_power_w", p)?;
        }

        if !d.conduction.matches_family(d.family) {
            return Err(Error::InvalidParameters(format!(
                "conduction rating {:?} does not match device family {}",
                d.conduction, d.family
            )));
        }

        require_positive(
            "cooling.thermal_resistance_c_per_w",
            self.cooling.thermal_resistance_c_per_w,
        )?;
        require_positive("cooling.rated_dissipation_w", self.cooling.rated_dissipation_w)?;
        if let Some(b) = self.cooling.budget_override_w {
            require_positive("cooling.budget_override_w", b)?;
        }

        if !self.ambient_temp_c.is_finite() {
            return Err(Error::InvalidParameters(
                "ambient_temp_c must be finite".to_string(),
            ));
        }
        require_positive("switching_freq_hz", self.switching_freq_hz)?;

        if self.sweep_steps == 0 {
            return Err(Error::InvalidParameters(
                "sweep_steps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Junction-to-ambient thermal resistance: device Rθjc + cooling Rθca (°C/W)
    pub fn total_thermal_resistance_c_per_w(&self) -> f64 {
        self.device.thermal_resistance_c_per_w + self.cooling.thermal_resistance_c_per_w
    }

    /// Effective cooling budget (W)
    ///
    /// The user override applies only in budget-limit mode; every other mode
    /// uses the cooling solution's nominal rating.
    pub fn effective_budget_w(&self) -> f64 {
        match (self.termination, self.cooling.budget_override_w) {
            (TerminationMode::BudgetLimit, Some(override_w)) => override_w,
            _ => self.cooling.rated_dissipation_w,
        }
    }

    /// Return a new parameter value with the given overrides applied
    ///
    /// Supports iterative what-if exploration (e.g. an advisory workflow
    /// re-running the engine with a better heatsink) without mutating the
    /// base parameters.
    pub fn with_overrides(&self, overrides: &ParameterOverrides) -> SimulationParameters {
        let mut params = self.clone();

        if let Some(ambient) = overrides.ambient_temp_c {
            params.ambient_temp_c = ambient;
        }
        if let Some(freq) = overrides.switching_freq_hz {
            params.switching_freq_hz = freq;
        }
        if let Some(r) = overrides.cooling_resistance_c_per_w {
            params.cooling.thermal_resistance_c_per_w = r;
        }
        if let Some(w) = overrides.rated_dissipation_w {
            params.cooling.rated_dissipation_w = w;
        }
        if let Some(w) = overrides.budget_override_w {
            params.cooling.budget_override_w = Some(w);
        }
        if let Some(mode) = overrides.termination {
            params.termination = mode;
        }
        if let Some(strategy) = overrides.strategy {
            params.strategy = strategy;
        }
        if let Some(steps) = overrides.sweep_steps {
            params.sweep_steps = steps;
        }

        params
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParameters(format!(
            "{} must be strictly positive, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Partial overrides for `SimulationParameters::with_overrides`
///
/// All fields optional; absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides {
    pub ambient_temp_c: Option<f64>,
    pub switching_freq_hz: Option<f64>,
    pub cooling_resistance_c_per_w: Option<f64>,
    pub rated_dissipation_w: Option<f64>,
    pub budget_override_w: Option<f64>,
    pub termination: Option<TerminationMode>,
    pub strategy: Option<SearchStrategy>,
    pub sweep_steps: Option<u32>,
}
