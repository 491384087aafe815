//! # Worker: one long-lived participant in every round.
//!
//! A [`Worker`] is spawned once at [`start`](crate::Pool::start) and lives
//! until shutdown. It sleeps on the round channel, drains its share of each
//! round under the configured [`Partition`], wraps every task invocation in
//! the configured [`ErrorPolicy`], and the last worker out finalizes the
//! round.
//!
//! ## Round flow
//! ```text
//! loop {
//!   ├─► wait: round channel changed | shutdown cancelled
//!   ├─► drain partition:
//!   │     claim boundary: status == Processing? cancelled?   (cooperative)
//!   │     run task ──► Ok / Canceled  → continue
//!   │               └► Err(e)         → ErrorPolicy
//!   │                    ├─ Propagate → WorkerLost, leave loop permanently
//!   │                    ├─ Ignore    → continue
//!   │                    ├─ Log       → record + TaskFailed, continue
//!   │                    └─ Terminate → record + TaskFailed,
//!   │                                   status Processing→Error, continue
//!   └─► active.fetch_sub(1) == 1  → finalize round
//! }
//! ```
//!
//! ## Rules
//! - A claim boundary is the **only** place round cancellation is observed;
//!   an already-executing task runs to completion.
//! - Every surviving worker decrements the active counter exactly once per
//!   round, whether or not it claimed any task.
//! - A worker lost to `Propagate` never decrements: the round is forfeited
//!   by design of that policy.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::core::round::Round;
use crate::core::status::{Status, StatusCell};
use crate::error::{PoolError, TaskError, TaskFailure};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{ClearPolicy, ErrorPolicy, Partition};
use crate::tasks::Buffer;

/// Outcome of one worker's participation in one round.
enum Participation {
    /// The worker drained its share (possibly stopping early at a claim
    /// boundary) and decremented the active counter.
    Finished,
    /// A task failure was fatal under `Propagate`; the worker must exit.
    Fatal { task: Arc<str>, error: TaskError },
}

/// One long-lived round participant.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) pool_size: usize,
    pub(crate) partition: Partition,
    pub(crate) on_failure: ErrorPolicy,
    pub(crate) clear: ClearPolicy,
    pub(crate) status: Arc<StatusCell>,
    pub(crate) rounds: watch::Receiver<Option<Arc<Round>>>,
    pub(crate) buffer: Arc<Mutex<Buffer>>,
    pub(crate) bus: Bus,
    pub(crate) cancel: CancellationToken,
}

impl Worker {
    /// Runs until shutdown cancellation (or a fatal task failure under
    /// `Propagate`).
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.rounds.changed() => {
                    if changed.is_err() {
                        // Pool dropped the round channel; nothing left to do.
                        break;
                    }
                }
                _ = self.cancel.cancelled() => break,
            }

            let round = match self.rounds.borrow_and_update().clone() {
                Some(round) => round,
                None => continue,
            };

            if let Participation::Fatal { task, error } = self.take_part(&round).await {
                self.bus.publish(
                    Event::now(EventKind::WorkerLost)
                        .with_worker(self.id)
                        .with_round(round.seq)
                        .with_task(task)
                        .with_reason(error.to_string()),
                );
                return;
            }
        }
    }

    /// Drains this worker's share of the round and decrements the active
    /// counter; the last worker out finalizes.
    async fn take_part(&self, round: &Round) -> Participation {
        let participation = match self.partition {
            Partition::Strided => self.drain_strided(round).await,
            Partition::SharedCursor => self.drain_shared_cursor(round).await,
        };

        if matches!(participation, Participation::Fatal { .. }) {
            // Forfeit: the active counter is left short and the round can
            // only be resolved by shutdown tearing it down.
            return participation;
        }

        if round.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.finalize(round);
        }
        participation
    }

    /// Static partition: start at own index, advance by pool size.
    async fn drain_strided(&self, round: &Round) -> Participation {
        let total = round.tasks.len();
        let mut index = self.id;
        while index < total {
            if !self.may_claim() {
                break;
            }
            if let Some(fatal) = self.execute(round, index).await {
                return fatal;
            }
            index += self.pool_size;
        }
        Participation::Finished
    }

    /// Dynamic partition: claim the next index from the shared cursor.
    async fn drain_shared_cursor(&self, round: &Round) -> Participation {
        let total = round.tasks.len();
        loop {
            let index = round.cursor.fetch_add(1, Ordering::Relaxed);
            if index >= total {
                break;
            }
            if !self.may_claim() {
                break;
            }
            if let Some(fatal) = self.execute(round, index).await {
                return fatal;
            }
        }
        Participation::Finished
    }

    /// Claim boundary check: the round must still be live and the pool not
    /// shutting down.
    fn may_claim(&self) -> bool {
        !self.cancel.is_cancelled() && self.status.get() == Status::Processing
    }

    /// Runs one task and feeds any failure to the error policy.
    ///
    /// Returns `Some` only for a `Propagate` fatality.
    async fn execute(&self, round: &Round, index: usize) -> Option<Participation> {
        let task = &round.tasks[index];
        // Child token: a task can observe shutdown but cannot cancel the pool.
        match task.run(self.cancel.child_token()).await {
            Ok(()) | Err(TaskError::Canceled) => None,
            Err(error) => self.absorb_failure(round, task.name(), error),
        }
    }

    fn absorb_failure(
        &self,
        round: &Round,
        task: &str,
        error: TaskError,
    ) -> Option<Participation> {
        match self.on_failure {
            ErrorPolicy::Propagate => Some(Participation::Fatal {
                task: Arc::from(task),
                error,
            }),
            ErrorPolicy::Ignore => None,
            ErrorPolicy::Log => {
                self.capture(round, task, error);
                None
            }
            ErrorPolicy::Terminate => {
                // Record before flipping status so the finalizer always
                // finds the failure that caused the Error.
                self.capture(round, task, error);
                self.status.transition(Status::Processing, Status::Error);
                None
            }
        }
    }

    fn capture(&self, round: &Round, task: &str, error: TaskError) {
        let failure = TaskFailure {
            task: Arc::from(task),
            error,
        };
        self.bus.publish(
            Event::now(EventKind::TaskFailed)
                .with_round(round.seq)
                .with_task(Arc::clone(&failure.task))
                .with_reason(failure.error.to_string()),
        );
        round.record_failure(failure);
    }

    /// Runs on the worker that brings the active counter to zero.
    ///
    /// Order matters: the buffer is disposed of first, then the status
    /// leaves `Processing` (releasing `wait_for_finished` waiters), then the
    /// deferred result resolves.
    fn finalize(&self, round: &Round) {
        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            match self.clear {
                ClearPolicy::Never => {}
                ClearPolicy::UponCompletion => buffer.clear(),
                ClearPolicy::AtNextWorkload => buffer.mark_stale(),
            }
        }

        let clean = self.status.transition(Status::Processing, Status::Ready);
        let outcome = if clean {
            if self.cancel.is_cancelled() {
                Err(PoolError::Interrupted)
            } else {
                Ok(())
            }
        } else {
            // The compare failed: a Terminate moved the pool to Error.
            match round.first_failure() {
                Some(failure) => Err(PoolError::RoundFailed { failure }),
                None => Err(PoolError::Interrupted),
            }
        };

        match &outcome {
            Ok(()) => {
                self.bus
                    .publish(Event::now(EventKind::RoundCompleted).with_round(round.seq));
            }
            Err(err) => {
                self.bus.publish(
                    Event::now(EventKind::RoundFailed)
                        .with_round(round.seq)
                        .with_reason(err.to_string()),
                );
            }
        }

        round.resolve(outcome);
    }
}
