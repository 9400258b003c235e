//! Sample producer
//!
//! Runs a search driver on a blocking worker task so thousands of
//! floating-point evaluations never stall the consumer, emitting one message
//! per probed current into the delivery queue. Cancellation is cooperative:
//! the emit closure checks a shared flag between evaluations and the driver
//! stops within one evaluation step. Completion (or a worker panic) is
//! reported exactly once through a oneshot channel.

use crate::delivery::SampleSender;
use crate::search::{self, SearchOutcome};
use ampenv_common::error::{Error, Result};
use ampenv_common::params::SimulationParameters;
use ampenv_common::types::SearchStrategy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Spawn the producer for one run
///
/// Returns the supervising task handle (awaited on cancellation) and the
/// completion channel carrying the driver's outcome or a worker error.
pub fn spawn_producer(
    params: SimulationParameters,
    bisection_iters: u32,
    sender: SampleSender,
    cancel: Arc<AtomicBool>,
) -> (JoinHandle<()>, oneshot::Receiver<Result<SearchOutcome>>) {
    spawn_worker(move || run_driver(&params, bisection_iters, &sender, &cancel))
}

/// Supervise one blocking driver invocation
///
/// A panic in the driver surfaces at the join and is reported through the
/// completion channel as a worker error; already-delivered samples stay
/// valid either way.
fn spawn_worker<F>(driver: F) -> (JoinHandle<()>, oneshot::Receiver<Result<SearchOutcome>>)
where
    F: FnOnce() -> SearchOutcome + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    let join = tokio::spawn(async move {
        let worker = tokio::task::spawn_blocking(driver);

        let result = match worker.await {
            Ok(outcome) => Ok(outcome),
            Err(join_err) => {
                error!(%join_err, "simulation worker panicked");
                Err(Error::Worker(format!("simulation worker panicked: {}", join_err)))
            }
        };

        if tx.send(result).is_err() {
            debug!("run handle dropped before completion was delivered");
        }
    });

    (join, rx)
}

/// Execute the configured driver, pushing every probe into the queue
fn run_driver(
    params: &SimulationParameters,
    bisection_iters: u32,
    sender: &SampleSender,
    cancel: &AtomicBool,
) -> SearchOutcome {
    let emit = |point| {
        if cancel.load(Ordering::Acquire) {
            return false;
        }
        sender.push(point);
        true
    };

    match params.strategy {
        SearchStrategy::Linear => search::linear_sweep(params, params.sweep_steps, emit),
        SearchStrategy::Bisection => search::bisection(params, bisection_iters, emit),
    }
}
