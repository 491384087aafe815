//! # Runtime events emitted by the pool and its workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Pool lifecycle**: started, shutdown requested, grace exceeded, stopped
//! - **Round lifecycle**: round started, task failed, round completed/failed,
//!   worker lost
//! - **Subscriber events**: overflow and panic reports from the fan-out layer
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! names, failure reasons, and round sequence numbers.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use tickpool::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::TaskFailed)
//!     .with_round(3)
//!     .with_task("corpse-decay")
//!     .with_reason("missing loot table");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("corpse-decay"));
//! assert_eq!(ev.round, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Pool lifecycle events ===
    /// Workers were spawned and the pool reached `Ready`.
    ///
    /// Sets:
    /// - `count`: number of workers spawned
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PoolStarted,

    /// Shutdown was requested by the caller.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShutdownRequested,

    /// Shutdown grace elapsed with a round still in flight.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    GraceExceeded,

    /// All workers were joined and the pool reached `Stopped`.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PoolStopped,

    // === Round lifecycle events ===
    /// A round began and workers were woken.
    ///
    /// Sets:
    /// - `round`: round sequence number (1-based)
    /// - `count`: number of tasks in the round's snapshot
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RoundStarted,

    /// A task failed and the failure was captured (`Log`/`Terminate`
    /// policies only).
    ///
    /// Sets:
    /// - `round`: round sequence number
    /// - `task`: task name
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskFailed,

    /// The round finalized successfully.
    ///
    /// Sets:
    /// - `round`: round sequence number
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RoundCompleted,

    /// The round finalized in the sticky `Error` status.
    ///
    /// Sets:
    /// - `round`: round sequence number
    /// - `reason`: first captured failure
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RoundFailed,

    /// A worker left its run loop permanently (`Propagate` policy).
    ///
    /// Sets:
    /// - `worker`: worker index
    /// - `task`: name of the task whose failure was fatal
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerLost,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Round sequence number, if applicable.
    pub round: Option<u64>,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Generic count (workers spawned, tasks in a round).
    pub count: Option<usize>,
    /// Worker index, if applicable.
    pub worker: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            round: None,
            task: None,
            reason: None,
            count: None,
            worker: None,
        }
    }

    /// Attaches a round sequence number.
    #[inline]
    pub fn with_round(mut self, round: u64) -> Self {
        self.round = Some(round);
        self
    }

    /// Attaches a task (or subscriber) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a generic count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a worker index.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
