//! Bounded delivery queue between the sample producer and the consumer
//!
//! Single-producer single-consumer queue with backpressure by eviction: the
//! producer never blocks, and on overflow the oldest entries are dropped.
//! The consumer drains on a fixed cadence measured from a monotonic clock;
//! a drain call before the tick has elapsed is a no-op, and an empty queue
//! is a normal `None` result, never a blocking wait.
//!
//! Design:
//! - Producer (worker task): pushes one point per model evaluation
//! - Consumer (run handle): drains at the delivery tick
//! - The queue is the only synchronization point between the two; the lock
//!   is held only for the push/pop itself

use ampenv_common::types::{DataPoint, SearchStrategy};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// During a fast linear sweep the consumer takes a batch per tick and keeps
/// only its last point; the batch is this fraction of the backlog
const SWEEP_BATCH_DIVISOR: usize = 10;

/// Overflow warnings are emitted once per this many evictions
const EVICTION_WARN_INTERVAL: u64 = 100;

#[derive(Debug)]
struct Shared {
    queue: Mutex<VecDeque<DataPoint>>,
    dropped: AtomicU64,
}

impl Shared {
    /// Push and pop each leave the deque consistent, so a lock poisoned by
    /// a panicking producer is recovered rather than cascading the panic
    /// into the consumer.
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<DataPoint>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Bounded delivery queue, split into sender and drainer halves
pub struct DeliveryQueue {
    shared: Arc<Shared>,
    max_len: usize,
    tick: Duration,
}

impl DeliveryQueue {
    pub fn new(max_len: usize, tick: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::with_capacity(max_len.min(4096))),
                dropped: AtomicU64::new(0),
            }),
            max_len,
            tick,
        }
    }

    /// Split into producer and consumer halves
    ///
    /// The sender moves into the worker task; the drainer stays with the
    /// consumer.
    pub fn split(self) -> (SampleSender, SampleDrainer) {
        let sender = SampleSender {
            shared: Arc::clone(&self.shared),
            max_len: self.max_len,
        };
        let drainer = SampleDrainer {
            shared: self.shared,
            tick: self.tick,
            last_drain: None,
        };
        (sender, drainer)
    }
}

/// Producer half: non-blocking push with drop-oldest eviction
pub struct SampleSender {
    shared: Arc<Shared>,
    max_len: usize,
}

impl SampleSender {
    /// Push a point, evicting the oldest entry when the queue is full
    ///
    /// Never blocks the producer beyond the queue lock itself.
    pub fn push(&self, point: DataPoint) {
        let mut queue = self.shared.lock();
        if queue.len() >= self.max_len {
            queue.pop_front();
            let count = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if count % EVICTION_WARN_INTERVAL == 0 {
                warn!(
                    dropped = count,
                    max_len = self.max_len,
                    "delivery queue overflow, evicting oldest samples"
                );
            }
        }
        queue.push_back(point);
    }

    /// Entries evicted so far
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half: fixed-cadence, strategy-aware drain
#[derive(Debug)]
pub struct SampleDrainer {
    shared: Arc<Shared>,
    tick: Duration,
    last_drain: Option<Instant>,
}

impl SampleDrainer {
    /// Drain the queue if the tick has elapsed
    ///
    /// Sampling policy per strategy:
    /// - Bisection: one point per tick, preserving convergence order
    /// - Linear: pop `max(1, backlog/10)` and return only the last point,
    ///   so the queue drains faster than a fast sweep fills it
    ///
    /// Returns `None` before the tick has elapsed, and `None` when the queue
    /// is empty; neither is an error.
    pub fn drain(&mut self, strategy: SearchStrategy, now: Instant) -> Option<DataPoint> {
        if let Some(last) = self.last_drain {
            if now.duration_since(last) < self.tick {
                return None;
            }
        }
        self.last_drain = Some(now);

        let mut queue = self.shared.lock();
        let backlog = queue.len();
        if backlog == 0 {
            return None;
        }

        let take = match strategy {
            SearchStrategy::Bisection => 1,
            SearchStrategy::Linear => (backlog / SWEEP_BATCH_DIVISOR).max(1),
        };

        let mut last_point = None;
        for _ in 0..take {
            last_point = queue.pop_front();
        }
        trace!(backlog, take, "drained delivery queue");
        last_point
    }

    /// Current backlog
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries evicted so far on the producer side
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Discard all queued entries and reset the cadence
    pub fn clear(&mut self) {
        self.shared.lock().clear();
        self.last_drain = None;
    }
}
