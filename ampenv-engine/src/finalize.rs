//! Result finalizer
//!
//! Converts a search driver's convergence point into the canonical
//! `SimulationResult`: clamp the safe current to the device rating,
//! re-evaluate the model once at that current, and attach status, reason,
//! and a human-readable summary.

use crate::model;
use crate::search::SearchOutcome;
use ampenv_common::params::SimulationParameters;
use ampenv_common::types::{RunStatus, SimulationResult};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Build the canonical result for a completed run
pub fn finalize(
    params: &SimulationParameters,
    outcome: &SearchOutcome,
    run_id: Uuid,
) -> SimulationResult {
    let safe_current_a = outcome.safe_current_a.min(params.device.max_current_a);
    let eval = model::evaluate(safe_current_a, params);

    if !outcome.converged && !outcome.cancelled {
        warn!(
            run_id = %run_id,
            safe_current_a,
            "iteration budget exhausted before reaching tolerance; reporting best bound"
        );
    }

    let result = match &eval.violation {
        None => {
            let detail = match &outcome.binding {
                Some(binding) => format!(
                    "maximum safe current is {:.2} A at {:.1} °C junction temperature, bounded by {}",
                    safe_current_a, eval.temperature_c, binding.reason
                ),
                None => format!(
                    "device operates safely at its full rating of {:.2} A ({:.1} °C junction temperature)",
                    safe_current_a, eval.temperature_c
                ),
            };

            SimulationResult {
                run_id,
                status: RunStatus::Success,
                max_safe_current_a: safe_current_a,
                failure_reason: outcome.binding.as_ref().map(|b| b.reason),
                detail,
                final_temperature_c: eval.temperature_c,
                conduction_loss_w: eval.conduction_loss_w,
                switching_loss_w: eval.switching_loss_w,
                total_loss_w: eval.total_loss_w,
                converged: outcome.converged,
                completed_at: Utc::now(),
            }
        }
        Some(violation) => {
            // Even zero current violates a limit: no safe envelope exists
            SimulationResult {
                run_id,
                status: RunStatus::Failure,
                max_safe_current_a: safe_current_a,
                failure_reason: Some(violation.reason),
                detail: violation.detail.clone(),
                final_temperature_c: eval.temperature_c,
                conduction_loss_w: eval.conduction_loss_w,
                switching_loss_w: eval.switching_loss_w,
                total_loss_w: eval.total_loss_w,
                converged: outcome.converged,
                completed_at: Utc::now(),
            }
        }
    };

    info!(
        run_id = %run_id,
        status = ?result.status,
        max_safe_current_a = result.max_safe_current_a,
        final_temperature_c = result.final_temperature_c,
        "run finalized"
    );

    result
}
