//! Engine facade
//!
//! Owns the per-run pipeline (producer → delivery queue → display ring →
//! interpolator) and hands the consumer a `RunHandle` for polling samples,
//! rendering frames, awaiting completion, and cancelling.
//!
//! Starting a new run first cancels any in-flight producer and waits for it
//! to terminate; only then is a fresh queue/ring/interpolator built, so an
//! old run's tail messages can never mix with a new run's samples. The
//! engine holds no residual state between runs and may be invoked
//! repeatedly with different parameters.

use crate::delivery::{DeliveryQueue, SampleDrainer};
use crate::display::DisplayRing;
use crate::finalize;
use crate::interp::{Interpolator, RenderFrame};
use crate::producer;
use crate::search::SearchOutcome;
use ampenv_common::config::EngineConfig;
use ampenv_common::error::{Error, Result};
use ampenv_common::params::SimulationParameters;
use ampenv_common::types::{DataPoint, SearchStrategy, SimulationResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Bookkeeping for the producer currently owned by the engine
struct ActiveRun {
    cancel: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

/// Simulation engine
///
/// Deterministic for given inputs; all streaming state lives in the
/// `RunHandle`, constructed fresh per run.
pub struct Engine {
    config: EngineConfig,
    current: Option<ActiveRun>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Engine with the shared default configuration
    pub fn with_defaults() -> Self {
        Self::new(ampenv_common::config::DEFAULTS.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a run
    ///
    /// Configuration and parameters are validated synchronously; on rejection
    /// no producer is spawned and no partial run occurs. Any in-flight run is
    /// cancelled and fully terminated before the new pipeline is constructed.
    pub async fn start(&mut self, params: SimulationParameters) -> Result<RunHandle> {
        self.config.validate()?;
        params.validate()?;

        if let Some(active) = self.current.take() {
            debug!("cancelling in-flight run before starting a new one");
            active.cancel.store(true, Ordering::Release);
            // The producer stops within one evaluation step; wait it out so
            // no tail message can land after the new pipeline exists.
            let _ = active.join.await;
        }

        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            part = %params.device.part_number,
            strategy = %params.strategy,
            mode = %params.termination,
            "starting simulation run"
        );

        let (sender, drainer) =
            DeliveryQueue::new(self.config.max_queue_len, self.config.delivery_tick()).split();
        let ring = DisplayRing::new(self.config.ring_capacity);
        let interp = Interpolator::new(self.config.interp_window(), self.config.easing);

        let cancel = Arc::new(AtomicBool::new(false));
        let strategy = params.strategy;
        let (join, completion) = producer::spawn_producer(
            params.clone(),
            self.config.bisection_iters,
            sender,
            Arc::clone(&cancel),
        );

        self.current = Some(ActiveRun {
            cancel: Arc::clone(&cancel),
            join,
        });

        Ok(RunHandle {
            run_id,
            strategy,
            params,
            cancel,
            drainer,
            ring,
            interp,
            pending_keyframe: None,
            completion,
        })
    }
}

/// Consumer-side handle for one simulation run
///
/// `poll` drives the delivery queue at its fixed cadence and feeds the
/// display ring; `frame` renders the interpolated view at whatever rate the
/// consumer runs; `complete` yields the canonical result.
#[derive(Debug)]
pub struct RunHandle {
    run_id: Uuid,
    strategy: SearchStrategy,
    params: SimulationParameters,
    cancel: Arc<AtomicBool>,
    drainer: SampleDrainer,
    ring: DisplayRing,
    interp: Interpolator,
    pending_keyframe: Option<DataPoint>,
    completion: oneshot::Receiver<Result<SearchOutcome>>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Request cooperative cancellation
    ///
    /// The producer stops emitting within one evaluation step. Idempotent;
    /// already-delivered samples remain valid.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Drain the next sample, if the delivery tick has elapsed and data is
    /// queued, and feed it to the display ring and interpolator
    ///
    /// Never blocks; `None` is the normal idle result.
    pub fn poll(&mut self, now: Instant) -> Option<DataPoint> {
        let point = self.drainer.drain(self.strategy, now)?;
        self.ring.push(point);

        if self.interp.ready_for_next(now) {
            self.interp.commit(point, now);
            self.pending_keyframe = None;
        } else {
            // Keep only the newest undelivered keyframe; the ring retains
            // the full history for display.
            self.pending_keyframe = Some(point);
        }

        Some(point)
    }

    /// Render the interpolated frame for time `now`
    ///
    /// Commits the next pending keyframe once the current blend finishes.
    /// `None` until the first sample has been delivered.
    pub fn frame(&mut self, now: Instant) -> Option<RenderFrame> {
        if let Some(pending) = self.pending_keyframe {
            if self.interp.ready_for_next(now) {
                self.interp.commit(pending, now);
                self.pending_keyframe = None;
            }
        }
        self.interp.frame(now)
    }

    /// Delivered samples, oldest to newest
    pub fn ring(&self) -> &DisplayRing {
        &self.ring
    }

    /// Samples queued but not yet delivered
    pub fn backlog(&self) -> usize {
        self.drainer.len()
    }

    /// Samples evicted from the delivery queue under backpressure
    pub fn dropped(&self) -> u64 {
        self.drainer.dropped()
    }

    /// Non-blocking completion check
    ///
    /// `None` while the producer is still running.
    pub fn try_complete(&mut self) -> Option<Result<SimulationResult>> {
        use tokio::sync::oneshot::error::TryRecvError;

        match self.completion.try_recv() {
            Ok(result) => Some(self.finalize_outcome(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(Error::Worker(
                "producer terminated without reporting completion".to_string(),
            ))),
        }
    }

    /// Await the producer and produce the canonical result
    pub async fn complete(mut self) -> Result<SimulationResult> {
        let result = (&mut self.completion).await.map_err(|_| {
            Error::Worker("producer terminated without reporting completion".to_string())
        })?;
        self.finalize_outcome(result)
    }

    fn finalize_outcome(
        &self,
        result: Result<SearchOutcome>,
    ) -> Result<SimulationResult> {
        let outcome = result?;
        if outcome.cancelled {
            return Err(Error::InvalidState(format!(
                "run {} was cancelled before completion",
                self.run_id
            )));
        }
        Ok(finalize::finalize(&self.params, &outcome, self.run_id))
    }
}
