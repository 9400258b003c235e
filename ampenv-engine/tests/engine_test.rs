//! End-to-end tests of the simulation engine
//!
//! Exercises full runs through the public `Engine`/`RunHandle` surface:
//! streaming delivery, bounds, strategy agreement, cancellation, and the
//! reference device scenario reproducible by hand from the loss model.

use ampenv_engine::{
    ConductionRating, CoolingSpec, DeviceFamily, DeviceSpec, Engine, EngineConfig, Error,
    FailureReason, RunStatus, SearchStrategy, SimulationParameters, TerminationMode,
};
use std::time::{Duration, Instant};

/// Reference device: IRFZ44N-class MOSFET (17.5 mΩ, 55 V, 105 ns total
/// switching time) at 100 kHz on a 1.1 °C/W heatsink, 25 °C ambient.
///
/// Thermal boundary by hand: allowed loss = (175 − 25) / 2.6 = 57.692 W;
/// solving 0.00875·I² + 0.28875·I = 57.692 gives I ≈ 66.359 A.
fn reference_params(strategy: SearchStrategy, mode: TerminationMode) -> SimulationParameters {
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
            name: "TO-220 heatsink".to_string(),
            thermal_resistance_c_per_w: 1.1,
            rated_dissipation_w: 60.0,
            budget_override_w: None,
        },
        ambient_temp_c: 25.0,
        switching_freq_hz: 100_000.0,
        termination: mode,
        strategy,
        sweep_steps: 100,
    }
}

const BOUNDARY_A: f64 = 66.359;

fn fast_config() -> EngineConfig {
    EngineConfig {
        delivery_tick_ms: 1,
        ..EngineConfig::default()
    }
}

/// Drain every queued sample through the handle, respecting the tick
async fn drain_all(handle: &mut ampenv_engine::RunHandle) -> Vec<ampenv_engine::DataPoint> {
    let mut points = Vec::new();
    loop {
        tokio::time::sleep(Duration::from_millis(1)).await;
        if let Some(point) = handle.poll(Instant::now()) {
            points.push(point);
        } else if handle.backlog() == 0 {
            break;
        }
    }
    points
}

#[tokio::test]
async fn test_reference_scenario_bisection() {
    let mut engine = Engine::new(fast_config());
    let handle = engine
        .start(reference_params(
            SearchStrategy::Bisection,
            TerminationMode::TemperatureLimit,
        ))
        .await
        .unwrap();

    let result = handle.complete().await.unwrap();

    assert_eq!(result.status, RunStatus::Success);
    assert!((result.max_safe_current_a - BOUNDARY_A).abs() < 0.01);
    assert!(result.final_temperature_c <= 175.0);
    assert!(result.final_temperature_c > 174.0, "should sit near the limit");
    assert_eq!(result.failure_reason, Some(FailureReason::Thermal));
    assert!(result.converged);
}

#[tokio::test]
async fn test_reference_scenario_strategies_agree() {
    let mut engine = Engine::new(fast_config());

    let linear = engine
        .start(reference_params(
            SearchStrategy::Linear,
            TerminationMode::TemperatureLimit,
        ))
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    let bisection = engine
        .start(reference_params(
            SearchStrategy::Bisection,
            TerminationMode::TemperatureLimit,
        ))
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    // One sweep step over [0, 90 A] in 100 steps is 0.9 A
    let tolerance = 0.9_f64.max(0.01);
    assert!(
        (linear.max_safe_current_a - bisection.max_safe_current_a).abs() <= tolerance,
        "linear {} vs bisection {}",
        linear.max_safe_current_a,
        bisection.max_safe_current_a
    );
}

#[tokio::test]
async fn test_safe_current_never_exceeds_rating() {
    // Generous limits everywhere: the rating itself must cap the result.
    let mut params = reference_params(
        SearchStrategy::Bisection,
        TerminationMode::TemperatureLimit,
    );
    params.device.max_junction_temp_c = 10_000.0;

    let mut engine = Engine::new(fast_config());
    let result = engine.start(params).await.unwrap().complete().await.unwrap();

    assert_eq!(result.max_safe_current_a, 75.0);
    assert_eq!(result.status, RunStatus::Success);
}

#[tokio::test]
async fn test_hot_ambient_fails_at_zero_current() {
    let mut params = reference_params(
        SearchStrategy::Linear,
        TerminationMode::TemperatureLimit,
    );
    params.ambient_temp_c = 200.0;

    let mut engine = Engine::new(fast_config());
    let result = engine.start(params).await.unwrap().complete().await.unwrap();

    assert_eq!(result.status, RunStatus::Failure);
    assert_eq!(result.max_safe_current_a, 0.0);
    assert_eq!(result.failure_reason, Some(FailureReason::Thermal));
}

#[tokio::test]
async fn test_first_to_fail_power_rating_priority() {
    // Power rating (30 W) binds below the cooling budget (45 W) and the
    // thermal limit; the reported reason must be PowerDissipation even
    // though higher currents would also exceed the budget.
    let mut params = reference_params(SearchStrategy::Linear, TerminationMode::FirstToFail);
    params.device.max_power_w = Some(30.0);
    params.cooling.rated_dissipation_w = 45.0;

    let mut engine = Engine::new(fast_config());
    let result = engine.start(params).await.unwrap().complete().await.unwrap();

    assert_eq!(result.failure_reason, Some(FailureReason::PowerDissipation));
    assert_eq!(result.status, RunStatus::Success);
    assert!(result.total_loss_w <= 30.0);
}

#[tokio::test]
async fn test_budget_mode_with_override() {
    let mut params = reference_params(SearchStrategy::Bisection, TerminationMode::BudgetLimit);
    params.cooling.rated_dissipation_w = 100.0;
    params.cooling.budget_override_w = Some(20.0);

    let mut engine = Engine::new(fast_config());
    let result = engine.start(params).await.unwrap().complete().await.unwrap();

    assert_eq!(result.failure_reason, Some(FailureReason::CoolingBudget));
    // Loss at the safe current respects the 20 W override
    assert!(result.total_loss_w <= 20.0);
}

#[tokio::test]
async fn test_linear_stream_ordered_and_clamped() {
    let mut engine = Engine::new(fast_config());
    let mut handle = engine
        .start(reference_params(
            SearchStrategy::Linear,
            TerminationMode::TemperatureLimit,
        ))
        .await
        .unwrap();

    let points = drain_all(&mut handle).await;
    assert!(!points.is_empty());

    for pair in points.windows(2) {
        assert!(
            pair[1].current_a >= pair[0].current_a,
            "linear sweep must deliver non-decreasing currents"
        );
    }
    for point in &points {
        assert!((0.0..=100.0).contains(&point.progress));
        assert_eq!(point.limit_value, 175.0);
    }

    // Model invariant holds on every streamed point
    for point in &points {
        let expected = 25.0 + point.total_loss_w * 2.6;
        assert!((point.temperature_c - expected).abs() < 1e-9);
    }

    let result = handle.complete().await.unwrap();
    assert!(result.max_safe_current_a <= 75.0);
}

#[tokio::test]
async fn test_ring_capacity_bound() {
    let config = EngineConfig {
        delivery_tick_ms: 1,
        ring_capacity: 8,
        ..EngineConfig::default()
    };
    let mut params = reference_params(
        SearchStrategy::Linear,
        TerminationMode::TemperatureLimit,
    );
    params.sweep_steps = 500;

    let mut engine = Engine::new(config);
    let mut handle = engine.start(params).await.unwrap();
    drain_all(&mut handle).await;

    assert!(handle.ring().len() <= 8);
    let ordered = handle.ring().ordered();
    for pair in ordered.windows(2) {
        assert!(pair[1].current_a >= pair[0].current_a);
    }
}

#[tokio::test]
async fn test_queue_bound_under_fast_producer() {
    let config = EngineConfig {
        delivery_tick_ms: 1,
        max_queue_len: 50,
        ..EngineConfig::default()
    };
    let mut params = reference_params(
        SearchStrategy::Linear,
        TerminationMode::TemperatureLimit,
    );
    params.sweep_steps = 100_000;

    let mut engine = Engine::new(config);
    let mut handle = engine.start(params).await.unwrap();

    // The producer floods the queue far faster than the 1 ms drain; the
    // bound must hold throughout and evictions must be recorded.
    for _ in 0..200 {
        assert!(handle.backlog() <= 50);
        handle.poll(Instant::now());
        tokio::time::sleep(Duration::from_micros(200)).await;
    }
    assert!(handle.dropped() > 0, "a flooded queue must record evictions");

    let result = handle.complete().await.unwrap();
    assert!(result.max_safe_current_a <= 75.0);
}

#[tokio::test]
async fn test_cancellation_stops_delivery() {
    let mut params = reference_params(
        SearchStrategy::Linear,
        TerminationMode::TemperatureLimit,
    );
    params.sweep_steps = 50_000_000; // long enough to cancel mid-run

    let mut engine = Engine::new(fast_config());
    let handle = engine.start(params).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    handle.cancel();
    assert!(handle.is_cancelled());

    // Producer stops within one evaluation step; the backlog freezes.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let frozen = handle.backlog();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.backlog(), frozen);

    assert!(matches!(
        handle.complete().await,
        Err(Error::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_interpolated_frames_track_delivery() {
    let mut engine = Engine::new(fast_config());
    let mut handle = engine
        .start(reference_params(
            SearchStrategy::Bisection,
            TerminationMode::TemperatureLimit,
        ))
        .await
        .unwrap();

    // No frame before anything is delivered
    assert!(handle.frame(Instant::now()).is_none());

    tokio::time::sleep(Duration::from_millis(20)).await;

    // First delivered sample passes through unmodified
    let first = loop {
        if let Some(point) = handle.poll(Instant::now()) {
            break point;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    };
    let frame = handle.frame(Instant::now()).unwrap();
    assert!(!frame.interpolated);
    assert_eq!(frame.point.current_a, first.current_a);

    // Once a second keyframe lands, frames interpolate and stay within the
    // keyframe envelope. The pending keyframe commits after the 120 ms
    // blend window elapses.
    drain_all(&mut handle).await;
    tokio::time::sleep(Duration::from_millis(130)).await;
    let frame = handle.frame(Instant::now()).unwrap();
    assert!(frame.interpolated);
    assert!((0.0..=100.0).contains(&frame.point.progress));

    handle.complete().await.unwrap();
}

#[tokio::test]
async fn test_engine_reusable_across_parameter_sets() {
    let mut engine = Engine::new(fast_config());
    let base = reference_params(SearchStrategy::Bisection, TerminationMode::TemperatureLimit);

    let baseline = engine
        .start(base.clone())
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    // A better heatsink (what-if exploration via overrides) widens the envelope
    let overrides = ampenv_engine::ParameterOverrides {
        cooling_resistance_c_per_w: Some(0.4),
        ..Default::default()
    };
    let improved = engine
        .start(base.with_overrides(&overrides))
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    assert!(improved.max_safe_current_a > baseline.max_safe_current_a);
}
