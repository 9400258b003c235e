//! Loss and temperature model
//!
//! Pure evaluation of one operating point: conduction loss, switching loss,
//! junction temperature, and the mode-dependent limit check. Everything else
//! in the engine (search drivers, producer, finalizer) is built on
//! `evaluate` alone.
//!
//! # Model
//!
//! - Conduction loss at 50% duty cycle:
//!   MOSFET: `I² × Rds(on) × 0.5`, IGBT: `I × Vce(sat) × 0.5`
//! - Switching loss: `0.5 × Vmax × I × (tr + tf) × fsw`
//! - Junction temperature: `ambient + total loss × (Rθjc + Rθca)`
//!
//! # First-to-fail check order
//!
//! Temperature, then device power rating (when present), then cooling
//! budget, then rated current. The order is fixed: it determines which
//! reason is reported when several limits are violated at the same current.

use ampenv_common::params::SimulationParameters;
use ampenv_common::types::{DataPoint, FailureReason, TerminationMode};

/// Duty cycle assumed by the conduction loss model
const DUTY_CYCLE: f64 = 0.5;

/// A limit violated at a probed operating point
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub reason: FailureReason,
    pub detail: String,
}

/// Outcome of evaluating one operating point
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub conduction_loss_w: f64,
    pub switching_loss_w: f64,
    pub total_loss_w: f64,
    pub temperature_c: f64,

    /// First limit violated under the active termination mode, if any
    pub violation: Option<Violation>,
}

impl Evaluation {
    pub fn passes(&self) -> bool {
        self.violation.is_none()
    }
}

/// Evaluate the device at `current_a` under the given parameters
///
/// Pure and deterministic: same inputs, same outputs.
pub fn evaluate(current_a: f64, params: &SimulationParameters) -> Evaluation {
    use ampenv_common::params::ConductionRating;

    let device = &params.device;

    let conduction_loss_w = match device.conduction {
        ConductionRating::OnResistance(rds_on) => current_a * current_a * rds_on * DUTY_CYCLE,
        ConductionRating::SaturationVoltage(vce_sat) => current_a * vce_sat * DUTY_CYCLE,
    };

    let switching_loss_w = 0.5
        * device.max_voltage_v
        * current_a
        * (device.rise_time_s + device.fall_time_s)
        * params.switching_freq_hz;

    let total_loss_w = conduction_loss_w + switching_loss_w;
    let temperature_c =
        params.ambient_temp_c + total_loss_w * params.total_thermal_resistance_c_per_w();

    let violation = check_limits(current_a, total_loss_w, temperature_c, params);

    Evaluation {
        conduction_loss_w,
        switching_loss_w,
        total_loss_w,
        temperature_c,
        violation,
    }
}

/// Mode-dependent limit check, returning the first violation
fn check_limits(
    current_a: f64,
    total_loss_w: f64,
    temperature_c: f64,
    params: &SimulationParameters,
) -> Option<Violation> {
    let device = &params.device;

    let thermal = || {
        (temperature_c > device.max_junction_temp_c).then(|| Violation {
            reason: FailureReason::Thermal,
            detail: format!(
                "junction temperature {:.1} °C exceeds rated maximum {:.1} °C",
                temperature_c, device.max_junction_temp_c
            ),
        })
    };

    let budget = || {
        let budget_w = params.effective_budget_w();
        (total_loss_w > budget_w).then(|| Violation {
            reason: FailureReason::CoolingBudget,
            detail: format!(
                "total loss {:.2} W exceeds cooling budget {:.2} W",
                total_loss_w, budget_w
            ),
        })
    };

    match params.termination {
        TerminationMode::TemperatureLimit => thermal(),
        TerminationMode::BudgetLimit => budget(),
        TerminationMode::FirstToFail => {
            // Fixed priority: temperature > power rating > budget > current
            if let Some(v) = thermal() {
                return Some(v);
            }
            if let Some(max_power_w) = device.max_power_w {
                if total_loss_w > max_power_w {
                    return Some(Violation {
                        reason: FailureReason::PowerDissipation,
                        detail: format!(
                            "total loss {:.2} W exceeds device power rating {:.2} W",
                            total_loss_w, max_power_w
                        ),
                    });
                }
            }
            if let Some(v) = budget() {
                return Some(v);
            }
            if current_a > device.max_current_a {
                return Some(Violation {
                    reason: FailureReason::Current,
                    detail: format!(
                        "current {:.2} A exceeds rated maximum {:.2} A",
                        current_a, device.max_current_a
                    ),
                });
            }
            None
        }
    }
}

/// Build the streamed data point for an evaluated operating point
///
/// Progress is normalized against the active termination mode's limit and
/// clamped to [0, 100]. Temperature-based modes (including first-to-fail)
/// use the junction temperature rise over ambient as the progress axis;
/// budget mode uses total loss against the effective budget.
pub fn data_point(
    current_a: f64,
    eval: &Evaluation,
    params: &SimulationParameters,
) -> DataPoint {
    let (progress, limit_value) = match params.termination {
        TerminationMode::BudgetLimit => {
            let budget_w = params.effective_budget_w();
            (eval.total_loss_w / budget_w * 100.0, budget_w)
        }
        TerminationMode::TemperatureLimit | TerminationMode::FirstToFail => {
            let limit_c = params.device.max_junction_temp_c;
            let span_c = limit_c - params.ambient_temp_c;
            let progress = if span_c > 0.0 {
                (eval.temperature_c - params.ambient_temp_c) / span_c * 100.0
            } else {
                // Ambient already at or beyond the limit
                100.0
            };
            (progress, limit_c)
        }
    };

    DataPoint {
        current_a,
        temperature_c: eval.temperature_c,
        total_loss_w: eval.total_loss_w,
        conduction_loss_w: eval.conduction_loss_w,
        switching_loss_w: eval.switching_loss_w,
        progress: progress.clamp(0.0, 100.0),
        limit_value,
    }
}
