//! # Pool: the round coordinator.
//!
//! The [`Pool`] owns the worker set, the pending workload buffer, the status
//! state machine, the round channel, and the event bus. It exposes the whole
//! caller-facing surface: filling the buffer, running rounds, waiting for
//! completion, and shutting down.
//!
//! ## High-level architecture
//! ```text
//! Caller:                        Pool:                      Workers (N, fixed):
//!   append/set_workload ───► buffer (Mutex<Buffer>)
//!   process_workload    ───► status Ready→Processing
//!                            snapshot buffer ──► Round ───► watch channel
//!                            returns RoundHandle            │ (level-triggered wake)
//!   wait_for_finished   ───► status watch                   ▼
//!                                                     drain partition,
//!                                                     error policy per task,
//!                                                     last one finalizes:
//!                                                       buffer disposition,
//!                                                       Processing→Ready,
//!                                                       resolve handle
//! ```
//!
//! ## Rules
//! - Rounds are strictly serialized: a new round is only accepted in
//!   `Ready`, which the finalizer restores after the previous round.
//! - Buffer mutation during `Processing` is rejected with
//!   [`PoolError::Busy`] instead of racing the running round.
//! - Workers are spawned once and joined at [`shutdown`](Pool::shutdown);
//!   the pool is not restartable afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::core::builder::PoolBuilder;
use crate::core::round::{Round, RoundHandle};
use crate::core::status::{Status, StatusCell};
use crate::core::worker::Worker;
use crate::error::{PoolError, TaskFailure};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{Buffer, TaskRef, Workload};

/// Round-based fixed-size worker pool.
///
/// Construct with [`Pool::new`] or [`Pool::builder`], call
/// [`start`](Pool::start) once, then alternate between filling the workload
/// buffer and running rounds. See the [crate docs](crate) for a full
/// example.
pub struct Pool {
    cfg: PoolConfig,
    /// Resolved worker count (fixed for the pool's lifetime).
    size: usize,
    bus: Bus,
    subs: Option<Arc<SubscriberSet>>,
    status: Arc<StatusCell>,
    rounds: watch::Sender<Option<Arc<Round>>>,
    buffer: Arc<Mutex<Buffer>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
    round_seq: AtomicU64,
}

impl Pool {
    /// Creates a pool with no subscribers. Workers are not spawned until
    /// [`start`](Pool::start).
    pub fn new(cfg: PoolConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts building a pool, allowing subscribers to be attached.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn assemble(cfg: PoolConfig, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let size = cfg.worker_count();
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = if subs.is_empty() {
            None
        } else {
            Some(Arc::new(SubscriberSet::new(subs, bus.clone())))
        };
        let (rounds, _rx) = watch::channel(None);

        Self {
            cfg,
            size,
            bus,
            subs,
            status: Arc::new(StatusCell::new()),
            rounds,
            buffer: Arc::new(Mutex::new(Buffer::new())),
            workers: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
            round_seq: AtomicU64::new(0),
        }
    }

    /// Spawns the workers and moves the pool to `Ready`.
    ///
    /// Idempotent: a no-op when the workers already exist. Must be called
    /// within a Tokio runtime. A pool that has been
    /// [`shutdown`](Pool::shutdown) cannot be restarted.
    pub fn start(&self) {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        if !workers.is_empty() || self.cancel.is_cancelled() {
            return;
        }

        self.status.set(Status::Starting);
        if let Some(set) = &self.subs {
            self.spawn_subscriber_listener(Arc::clone(set));
        }

        for id in 0..self.size {
            let worker = Worker {
                id,
                pool_size: self.size,
                partition: self.cfg.partition,
                on_failure: self.cfg.on_failure,
                clear: self.cfg.clear,
                status: Arc::clone(&self.status),
                rounds: self.rounds.subscribe(),
                buffer: Arc::clone(&self.buffer),
                bus: self.bus.clone(),
                cancel: self.cancel.clone(),
            };
            workers.push(tokio::spawn(worker.run()));
        }

        self.bus
            .publish(Event::now(EventKind::PoolStarted).with_count(self.size));
        self.status.set(Status::Ready);
    }

    /// Appends one task to the pending workload.
    ///
    /// Under `ClearPolicy::AtNextWorkload`, a stale buffer (tasks of an
    /// already-finished round) is emptied before the push.
    ///
    /// # Errors
    /// [`PoolError::Busy`] while a round is in flight.
    pub fn append(&self, task: TaskRef) -> Result<(), PoolError> {
        if self.status.get() == Status::Processing {
            return Err(PoolError::Busy);
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(task, self.cfg.clear);
        Ok(())
    }

    /// Replaces the entire pending workload.
    ///
    /// With `wait_first`, any in-flight round is awaited before the replace;
    /// without it, a round in flight rejects the call. The replace is
    /// unconditional: it overwrites a stale buffer without consulting
    /// staleness and clears the mark.
    ///
    /// # Errors
    /// [`PoolError::Busy`] when `wait_first` is `false` and a round is in
    /// flight.
    pub async fn set_workload(
        &self,
        workload: Workload,
        wait_first: bool,
    ) -> Result<(), PoolError> {
        if wait_first {
            self.wait_for_finished().await;
        }
        if self.status.get() == Status::Processing {
            return Err(PoolError::Busy);
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(workload);
        Ok(())
    }

    /// Empties the pending workload.
    ///
    /// # Errors
    /// [`PoolError::Busy`] while a round is in flight.
    pub fn clear_workload(&self) -> Result<(), PoolError> {
        if self.status.get() == Status::Processing {
            return Err(PoolError::Busy);
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    /// Runs one round over the current workload buffer.
    ///
    /// Returns a [`RoundHandle`] that resolves when the round finalizes:
    ///
    /// - an empty buffer resolves immediately with `Ok(())` (a trivial
    ///   round, not an error);
    /// - a pool that was never started resolves immediately with
    ///   [`PoolError::NotStarted`];
    /// - a pool that is `Processing` or sitting in a sticky `Error` resolves
    ///   immediately with [`PoolError::NotReady`].
    ///
    /// The handle may be dropped to fire-and-forget the round;
    /// [`wait_for_finished`](Pool::wait_for_finished) still observes it.
    pub fn process_workload(&self) -> RoundHandle {
        if matches!(self.status.get(), Status::Stopped | Status::Starting) {
            return RoundHandle::immediate(Err(PoolError::NotStarted));
        }
        if !self.status.transition(Status::Ready, Status::Processing) {
            return RoundHandle::immediate(Err(PoolError::NotReady {
                status: self.status.get(),
            }));
        }

        let snapshot = self
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        if snapshot.is_empty() {
            // Trivial round: nothing to run, nothing to finalize.
            self.status.set(Status::Ready);
            return RoundHandle::immediate(Ok(()));
        }

        let seq = self.round_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let count = snapshot.len();
        let (round, handle) = Round::new(seq, snapshot, self.size);

        self.bus.publish(
            Event::now(EventKind::RoundStarted)
                .with_round(seq)
                .with_count(count),
        );
        self.rounds.send_replace(Some(Arc::new(round)));
        handle
    }

    /// Replaces the workload and immediately runs a round over it.
    ///
    /// Rejections surface through the returned handle ([`PoolError::Busy`]
    /// when a round is in flight).
    pub fn process(&self, workload: Workload) -> RoundHandle {
        if self.status.get() == Status::Processing {
            return RoundHandle::immediate(Err(PoolError::Busy));
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(workload);
        self.process_workload()
    }

    /// Waits until no round is in flight.
    ///
    /// Returns immediately when the pool is idle (any status but
    /// `Processing`).
    pub async fn wait_for_finished(&self) {
        self.status.wait_idle().await;
    }

    /// Acknowledges a sticky `Error` status, restoring `Ready` and emptying
    /// the error list.
    ///
    /// A no-op when the pool is not in `Error`.
    ///
    /// # Errors
    /// [`PoolError::Busy`] while a round is in flight.
    pub fn clear_errors(&self) -> Result<(), PoolError> {
        if self.status.get() == Status::Processing {
            return Err(PoolError::Busy);
        }
        if self.status.transition(Status::Error, Status::Ready) {
            if let Some(round) = self.rounds.borrow().as_ref() {
                round.clear_failures();
            }
        }
        Ok(())
    }

    /// Current pool status.
    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// Number of workers (fixed at construction).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of tasks in the pending workload buffer.
    pub fn pending_tasks(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the workers have been spawned.
    pub fn is_started(&self) -> bool {
        !self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Snapshot copy of the failures captured during the current (or most
    /// recent) round.
    ///
    /// Non-empty only under the `Log` and `Terminate` error policies.
    pub fn task_errors(&self) -> Vec<TaskFailure> {
        match self.rounds.borrow().as_ref() {
            Some(round) => round.failures_snapshot(),
            None => Vec::new(),
        }
    }

    /// New receiver for the pool's event stream.
    ///
    /// Independent of the subscriber fan-out; useful for tests and ad hoc
    /// tooling.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops the pool: waits up to `cfg.grace` for an in-flight round,
    /// cancels the workers, joins every one of them, and moves the status
    /// to `Stopped`.
    ///
    /// An open round that survives the grace window (including one wedged by
    /// a `Propagate` worker loss) is torn down; its handle resolves with
    /// [`PoolError::Interrupted`].
    ///
    /// # Errors
    /// [`PoolError::GraceExceeded`] when the round outlived the grace
    /// window.
    pub async fn shutdown(&self) -> Result<(), PoolError> {
        self.bus.publish(Event::now(EventKind::ShutdownRequested));

        let graceful = time::timeout(self.cfg.grace, self.wait_for_finished())
            .await
            .is_ok();

        self.cancel.cancel();
        // Dropping the last round resolves any still-pending handle with
        // Interrupted (see Round::drop).
        self.rounds.send_replace(None);

        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            workers.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }

        self.status.set(Status::Stopped);

        if graceful {
            self.bus.publish(Event::now(EventKind::PoolStopped));
            Ok(())
        } else {
            self.bus.publish(Event::now(EventKind::GraceExceeded));
            Err(PoolError::GraceExceeded {
                grace: self.cfg.grace,
            })
        }
    }

    /// Forwards bus events to the subscriber fan-out until the bus closes.
    fn spawn_subscriber_listener(&self, set: Arc<SubscriberSet>) {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit_arc(Arc::new(ev)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // Best-effort: workers cannot be joined here, but cancellation makes
        // them exit at their next claim boundary or wait point.
        self.cancel.cancel();
    }
}
