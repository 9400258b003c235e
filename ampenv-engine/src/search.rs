//! Search drivers: linear sweep and bisection
//!
//! Both strategies locate the boundary current of the safe operating
//! envelope using only `model::evaluate`, emitting one `DataPoint` per probe
//! through a caller-supplied closure. The closure returns `false` to abort
//! (cooperative cancellation); the driver then stops within one evaluation
//! step.
//!
//! Invariant: on identical parameters, the two strategies agree on the safe
//! current within one sweep step or the bisection tolerance, whichever is
//! larger.

use crate::model::{self, Violation};
use ampenv_common::params::SimulationParameters;
use ampenv_common::types::DataPoint;
use tracing::debug;

/// Linear sweep probes up to `max_current × 1.2`
pub const SWEEP_OVERDRIVE: f64 = 1.2;

/// Bisection searches `[0, max_current × 1.5]`: deliberately above the rated
/// current so the true thermal boundary is found even when the current
/// rating is not the binding constraint
pub const BISECTION_OVERDRIVE: f64 = 1.5;

/// Interval width below which a bisection run counts as cleanly converged (A)
pub const BISECTION_TOLERANCE_A: f64 = 0.01;

/// What a search driver found
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Largest confirmed-safe current (A), before clamping to the rating
    pub safe_current_a: f64,

    /// Number of model evaluations performed
    pub evaluations: u32,

    /// True when the emit closure aborted the run
    pub cancelled: bool,

    /// False when the bisection budget ran out above tolerance
    /// (linear sweeps always converge)
    pub converged: bool,

    /// The violation that bounded the search, if one was observed
    pub binding: Option<Violation>,
}

/// Step current from 0 to `max_current × 1.2` in `steps` equal increments
///
/// Stops at the first failing step; the safe current is the previous step's
/// current (0 when step 0 itself fails). A sweep that completes without any
/// failure reports the rated current as safe.
pub fn linear_sweep<F>(
    params: &SimulationParameters,
    steps: u32,
    mut emit: F,
) -> SearchOutcome
where
    F: FnMut(DataPoint) -> bool,
{
    let top_a = params.device.max_current_a * SWEEP_OVERDRIVE;
    let step_a = top_a / steps as f64;

    let mut safe_current_a = 0.0;
    let mut evaluations = 0;
    let mut binding = None;

    for i in 0..=steps {
        let current_a = step_a * i as f64;
        let eval = model::evaluate(current_a, params);
        evaluations += 1;

        if !emit(model::data_point(current_a, &eval, params)) {
            debug!(current_a, evaluations, "linear sweep cancelled");
            return SearchOutcome {
                safe_current_a,
                evaluations,
                cancelled: true,
                converged: false,
                binding,
            };
        }

        match eval.violation {
            Some(violation) => {
                debug!(
                    current_a,
                    reason = %violation.reason,
                    "linear sweep hit limit"
                );
                binding = Some(violation);
                break;
            }
            None => safe_current_a = current_a,
        }
    }

    if binding.is_none() {
        // Full pass with no failure: the rating itself is the bound
        safe_current_a = params.device.max_current_a;
    }

    SearchOutcome {
        safe_current_a,
        evaluations,
        cancelled: false,
        converged: true,
        binding,
    }
}

/// Bisect `[0, max_current × 1.5]` for a fixed iteration budget
///
/// Each iteration evaluates and emits the midpoint, then narrows to the safe
/// or unsafe half. Returns the largest confirmed-safe midpoint; when nothing
/// passes (pathological parameters) the safe current is 0.
pub fn bisection<F>(
    params: &SimulationParameters,
    iters: u32,
    mut emit: F,
) -> SearchOutcome
where
    F: FnMut(DataPoint) -> bool,
{
    let mut low_a = 0.0;
    let mut high_a = params.device.max_current_a * BISECTION_OVERDRIVE;

    let mut safe_current_a = 0.0;
    let mut evaluations = 0;
    let mut binding = None;

    for _ in 0..iters {
        let mid_a = (low_a + high_a) / 2.0;
        let eval = model::evaluate(mid_a, params);
        evaluations += 1;

        if !emit(model::data_point(mid_a, &eval, params)) {
            debug!(mid_a, evaluations, "bisection cancelled");
            return SearchOutcome {
                safe_current_a,
                evaluations,
                cancelled: true,
                converged: false,
                binding,
            };
        }

        match eval.violation {
            Some(violation) => {
                binding = Some(violation);
                high_a = mid_a;
            }
            None => {
                safe_current_a = mid_a;
                low_a = mid_a;
            }
        }
    }

    let width_a = high_a - low_a;
    let converged = width_a <= BISECTION_TOLERANCE_A;
    debug!(
        safe_current_a,
        width_a, converged, evaluations, "bisection finished"
    );

    SearchOutcome {
        safe_current_a,
        evaluations,
        cancelled: false,
        converged,
        binding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampenv_common::params::{
        ConductionRating, CoolingSpec, DeviceFamily, DeviceSpec,
    };
    use ampenv_common::types::{FailureReason, SearchStrategy, TerminationMode};

    /// 17.5 mΩ MOSFET, thermal boundary at ≈66.359 A (Rθ 2.6 °C/W,
    /// 150 °C allowed rise ⇒ 57.692 W loss budget)
    fn reference_params() -> SimulationParameters {
        SimulationParameters {
            device: DeviceSpec {
                part_number: "IRFZ44N".to_string(),
                family: DeviceFamily::Mosfet,
                max_current_a: 75.0,
                max_voltage_v: 55.0,
                max_power_w: None,
                conduction: ConductionRating::OnResistance(0.0175),
                rise_time_s: 60e-9,
                fall_time_s: 45e-9,
                thermal_resistance_c_per_w: 1.5,
                max_junction_temp_c: 175.0,
            },
            cooling: CoolingSpec {
                name: "heatsink".to_string(),
                thermal_resistance_c_per_w: 1.1,
                rated_dissipation_w: 60.0,
                budget_override_w: None,
            },
            ambient_temp_c: 25.0,
            switching_freq_hz: 100_000.0,
            termination: TerminationMode::TemperatureLimit,
            strategy: SearchStrategy::Linear,
            sweep_steps: 100,
        }
    }

    /// Analytic boundary for the reference device
    const BOUNDARY_A: f64 = 66.359;

    #[test]
    fn test_linear_sweep_finds_boundary() {
        let params = reference_params();
        let outcome = linear_sweep(&params, 100, |_| true);

        // Step is 0.9 A; safe current is the last passing step below 66.359
        let step_a = 75.0 * SWEEP_OVERDRIVE / 100.0;
        assert!(!outcome.cancelled);
        assert!(outcome.converged);
        assert!(outcome.safe_current_a <= BOUNDARY_A);
        assert!(outcome.safe_current_a > BOUNDARY_A - step_a);
        assert_eq!(
            outcome.binding.as_ref().map(|v| v.reason),
            Some(FailureReason::Thermal)
        );
    }

    #[test]
    fn test_linear_sweep_currents_non_decreasing() {
        let params = reference_params();
        let mut emitted = Vec::new();
        linear_sweep(&params, 100, |p| {
            emitted.push(p);
            true
        });

        assert!(!emitted.is_empty());
        for pair in emitted.windows(2) {
            assert!(pair[1].current_a >= pair[0].current_a);
        }
        for point in &emitted {
            assert!((0.0..=100.0).contains(&point.progress));
        }
    }

    #[test]
    fn test_linear_sweep_no_failure_reports_rating() {
        let mut params = reference_params();
        params.device.max_junction_temp_c = 10_000.0; // never trips

        let outcome = linear_sweep(&params, 100, |_| true);
        assert_eq!(outcome.safe_current_a, 75.0);
        assert!(outcome.binding.is_none());
    }

    #[test]
    fn test_linear_sweep_step_zero_failure() {
        let mut params = reference_params();
        params.ambient_temp_c = 200.0; // hotter than the junction limit

        let mut emitted = 0;
        let outcome = linear_sweep(&params, 100, |_| {
            emitted += 1;
            true
        });

        assert_eq!(outcome.safe_current_a, 0.0);
        assert_eq!(emitted, 1, "sweep must stop at the first failing step");
    }

    #[test]
    fn test_linear_sweep_cancellation_stops_within_one_step() {
        let params = reference_params();
        let mut emitted = 0;
        let outcome = linear_sweep(&params, 100, |_| {
            emitted += 1;
            emitted < 5
        });

        assert!(outcome.cancelled);
        assert_eq!(emitted, 5);
        assert_eq!(outcome.evaluations, 5);
    }

    #[test]
    fn test_bisection_converges_to_boundary() {
        let params = reference_params();
        let outcome = bisection(&params, 15, |_| true);

        assert!(!outcome.cancelled);
        assert!(outcome.converged, "15 iterations over 112.5 A is < 0.01 A");
        assert!((outcome.safe_current_a - BOUNDARY_A).abs() < 0.01);
        assert_eq!(outcome.evaluations, 15);
    }

    #[test]
    fn test_bisection_overdrives_past_rating() {
        // Boundary far above the rating: bisection should find ~1.5 × rating
        // (the finalizer clamps later, the driver itself does not).
        let mut params = reference_params();
        params.device.max_junction_temp_c = 10_000.0;

        let outcome = bisection(&params, 15, |_| true);
        let top_a = 75.0 * BISECTION_OVERDRIVE;
        assert!(outcome.safe_current_a > params.device.max_current_a);
        assert!(outcome.safe_current_a <= top_a);
    }

    #[test]
    fn test_bisection_all_fail_reports_zero() {
        let mut params = reference_params();
        params.ambient_temp_c = 200.0;

        let outcome = bisection(&params, 15, |_| true);
        assert_eq!(outcome.safe_current_a, 0.0);
        assert_eq!(
            outcome.binding.map(|v| v.reason),
            Some(FailureReason::Thermal)
        );
    }

    #[test]
    fn test_bisection_budget_exhaustion_flagged() {
        // 3 iterations over 112.5 A leaves a ~14 A interval: not converged,
        // but still a usable best bound.
        let params = reference_params();
        let outcome = bisection(&params, 3, |_| true);

        assert!(!outcome.converged);
        assert!(!outcome.cancelled);
        assert!(outcome.safe_current_a > 0.0);
    }

    #[test]
    fn test_strategies_agree_within_tolerance() {
        for (tweak_ambient, tweak_freq) in
            [(25.0, 100_000.0), (60.0, 100_000.0), (25.0, 250_000.0)]
        {
            let mut params = reference_params();
            params.ambient_temp_c = tweak_ambient;
            params.switching_freq_hz = tweak_freq;

            let sweep = linear_sweep(&params, 100, |_| true);
            let bisect = bisection(&params, 15, |_| true);

            let step_a = params.device.max_current_a * SWEEP_OVERDRIVE / 100.0;
            let tolerance = step_a.max(BISECTION_TOLERANCE_A);

            // Clamp both to the rating, as the finalizer would
            let a = sweep.safe_current_a.min(params.device.max_current_a);
            let b = bisect.safe_current_a.min(params.device.max_current_a);
            assert!(
                (a - b).abs() <= tolerance,
                "ambient {} freq {}: sweep {} vs bisection {}",
                tweak_ambient,
                tweak_freq,
                a,
                b
            );
        }
    }
}
