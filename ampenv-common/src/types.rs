//! Core vocabulary of the simulation engine
//!
//! Termination modes, search strategies, failure reasons, the per-probe
//! `DataPoint` record, and the canonical `SimulationResult`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Termination mode: which limit ends the search
///
/// - `FirstToFail`: stop at whichever applicable limit is violated first
/// - `TemperatureLimit`: only the junction temperature limit applies
/// - `BudgetLimit`: only the cooling solution's dissipation budget applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationMode {
    FirstToFail,
    TemperatureLimit,
    BudgetLimit,
}

impl TerminationMode {
    /// Parse mode from string (config files, CLI flags)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first_to_fail" | "first-to-fail" | "ftf" => Some(TerminationMode::FirstToFail),
            "temperature_limit" | "temperature-limit" | "temperature" => {
                Some(TerminationMode::TemperatureLimit)
            }
            "budget_limit" | "budget-limit" | "budget" => Some(TerminationMode::BudgetLimit),
            _ => None,
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TerminationMode::FirstToFail => "First to Fail",
            TerminationMode::TemperatureLimit => "Temperature Limit",
            TerminationMode::BudgetLimit => "Cooling Budget Limit",
        }
    }

    /// Get all available modes (for CLI help and validation)
    pub fn all_variants() -> &'static [TerminationMode] {
        &[
            TerminationMode::FirstToFail,
            TerminationMode::TemperatureLimit,
            TerminationMode::BudgetLimit,
        ]
    }
}

impl Default for TerminationMode {
    fn default() -> Self {
        TerminationMode::FirstToFail
    }
}

impl std::fmt::Display for TerminationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Search strategy used to locate the boundary current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Step current upward in equal increments, stop at the first failure
    Linear,

    /// Bisect the current interval for a fixed iteration budget
    Bisection,
}

impl SearchStrategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "sweep" => Some(SearchStrategy::Linear),
            "bisection" | "binary" => Some(SearchStrategy::Bisection),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SearchStrategy::Linear => "Linear Sweep",
            SearchStrategy::Bisection => "Bisection",
        }
    }

    pub fn all_variants() -> &'static [SearchStrategy] {
        &[SearchStrategy::Linear, SearchStrategy::Bisection]
    }
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Linear
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which limit a probe (or the whole run) tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Junction temperature exceeded the device's rated maximum
    Thermal,

    /// Probed current exceeded the device's rated maximum current
    Current,

    /// Total loss exceeded the device's rated power dissipation
    PowerDissipation,

    /// Total loss exceeded the cooling solution's dissipation budget
    CoolingBudget,
}

impl FailureReason {
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureReason::Thermal => "Junction Temperature",
            FailureReason::Current => "Rated Current",
            FailureReason::PowerDissipation => "Power Dissipation",
            FailureReason::CoolingBudget => "Cooling Budget",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Run completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// A non-zero safe operating current was confirmed
    Success,

    /// No safe operating current exists under these parameters
    Failure,
}

/// One probed operating point, streamed from the producer to the consumer
///
/// Invariants:
/// - `progress` is clamped to [0, 100]
/// - `temperature_c = ambient + total_loss_w × (device Rθjc + cooling Rθca)`
/// - `total_loss_w = conduction_loss_w + switching_loss_w`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Probed drain/collector current (A)
    pub current_a: f64,

    /// Resulting junction temperature (°C)
    pub temperature_c: f64,

    /// Total dissipated power (W)
    pub total_loss_w: f64,

    /// Conduction component of the loss (W)
    pub conduction_loss_w: f64,

    /// Switching component of the loss (W)
    pub switching_loss_w: f64,

    /// Progress toward the active termination mode's limit, in [0, 100]
    pub progress: f64,

    /// The limit value used to normalize `progress`
    /// (°C for temperature-based modes, W for budget mode)
    pub limit_value: f64,
}

/// Canonical result record, produced once per run by the finalizer
///
/// Immutable after creation. `failure_reason` names the limit that bounded
/// the search even when `status` is `Success`; it is `None` only when the
/// search completed without observing any violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Identifier of the run that produced this result
    pub run_id: Uuid,

    /// Success (non-zero safe current) or Failure (no safe current)
    pub status: RunStatus,

    /// Maximum safe continuous current (A), always ≤ the device's rated current
    pub max_safe_current_a: f64,

    /// The limit that bounded the search, if any was observed
    pub failure_reason: Option<FailureReason>,

    /// Human-readable summary of the outcome
    pub detail: String,

    /// Junction temperature at the safe current (°C)
    pub final_temperature_c: f64,

    /// Loss breakdown at the safe current
    pub conduction_loss_w: f64,
    pub switching_loss_w: f64,
    pub total_loss_w: f64,

    /// False when the bisection iteration budget was exhausted before the
    /// interval tightened below tolerance. Does not affect `status`.
    pub converged: bool,

    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_aliases() {
        assert_eq!(
            TerminationMode::from_str("first-to-fail"),
            Some(TerminationMode::FirstToFail)
        );
        assert_eq!(
            TerminationMode::from_str("ftf"),
            Some(TerminationMode::FirstToFail)
        );
        assert_eq!(
            TerminationMode::from_str("temperature"),
            Some(TerminationMode::TemperatureLimit)
        );
        assert_eq!(
            TerminationMode::from_str("BUDGET"),
            Some(TerminationMode::BudgetLimit)
        );
        assert_eq!(TerminationMode::from_str("invalid"), None);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(SearchStrategy::from_str("linear"), Some(SearchStrategy::Linear));
        assert_eq!(
            SearchStrategy::from_str("bisection"),
            Some(SearchStrategy::Bisection)
        );
        assert_eq!(SearchStrategy::from_str("binary"), Some(SearchStrategy::Bisection));
        assert_eq!(SearchStrategy::from_str(""), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TerminationMode::default(), TerminationMode::FirstToFail);
        assert_eq!(SearchStrategy::default(), SearchStrategy::Linear);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(format!("{}", SearchStrategy::Linear), "Linear Sweep");
        assert_eq!(format!("{}", FailureReason::CoolingBudget), "Cooling Budget");
        assert_eq!(format!("{}", TerminationMode::FirstToFail), "First to Fail");
    }

    #[test]
    fn test_serde_round_trip() {
        for mode in TerminationMode::all_variants() {
            let json = serde_json::to_string(mode).unwrap();
            let back: TerminationMode = serde_json::from_str(&json).unwrap();
            assert_eq!(*mode, back);
        }
        let json = serde_json::to_string(&SearchStrategy::Bisection).unwrap();
        assert_eq!(json, "\"bisection\"");
    }
}
