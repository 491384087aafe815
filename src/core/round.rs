//! # Round state and the deferred result handle.
//!
//! A [`Round`] is the shared state of one `process_workload` execution: an
//! immutable snapshot of the workload, the shared claim cursor, the active
//! worker counter, the captured failures, and the sender half of the
//! deferred result.
//!
//! [`RoundHandle`] is the caller-facing half: a future that resolves when
//! the round finalizes (or immediately, for rejected and empty rounds).
//!
//! ## Rules
//! - The task snapshot is immutable for the round's lifetime; workers index
//!   into it without locking.
//! - The active counter starts at the pool size; **every** surviving worker
//!   decrements it exactly once per round, and the worker that brings it to
//!   zero runs finalization.
//! - The failure list is only ever appended during the round and read by
//!   the finalizer and by `task_errors` snapshots.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::AtomicUsize;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{PoolError, TaskFailure};
use crate::tasks::TaskRef;

/// Shared state of one in-flight round.
pub(crate) struct Round {
    /// Round sequence number (1-based, monotonic per pool).
    pub(crate) seq: u64,
    /// Immutable snapshot of the workload at round start.
    pub(crate) tasks: Vec<TaskRef>,
    /// Shared claim cursor (`Partition::SharedCursor` only).
    pub(crate) cursor: AtomicUsize,
    /// Workers still participating; zero triggers finalization.
    pub(crate) active: AtomicUsize,
    failures: Mutex<Vec<TaskFailure>>,
    done: Mutex<Option<oneshot::Sender<Result<(), PoolError>>>>,
}

impl Round {
    /// Creates the round state and its paired caller handle.
    pub(crate) fn new(seq: u64, tasks: Vec<TaskRef>, workers: usize) -> (Self, RoundHandle) {
        let (tx, rx) = oneshot::channel();
        let round = Self {
            seq,
            tasks,
            cursor: AtomicUsize::new(0),
            active: AtomicUsize::new(workers),
            failures: Mutex::new(Vec::new()),
            done: Mutex::new(Some(tx)),
        };
        (round, RoundHandle::pending(rx))
    }

    /// Appends one captured failure, preserving capture order.
    pub(crate) fn record_failure(&self, failure: TaskFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
    }

    /// The first captured failure, if any.
    pub(crate) fn first_failure(&self) -> Option<TaskFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .cloned()
    }

    /// Snapshot copy of the captured failures.
    pub(crate) fn failures_snapshot(&self) -> Vec<TaskFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Empties the failure list (error acknowledgment between rounds).
    pub(crate) fn clear_failures(&self) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Resolves the deferred result. A second call is a no-op.
    pub(crate) fn resolve(&self, outcome: Result<(), PoolError>) {
        let sender = self
            .done
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = sender {
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Round {
    fn drop(&mut self) {
        // A round torn down before finalization (shutdown with a wedged or
        // in-flight round) must not leave its handle pending forever.
        self.resolve(Err(PoolError::Interrupted));
    }
}

/// Deferred result of one round.
///
/// Returned by [`process_workload`](crate::Pool::process_workload) and
/// [`process`](crate::Pool::process); resolves when the round finalizes:
///
/// - `Ok(())` — every claimable task was executed (or the round was empty)
/// - `Err(PoolError::RoundFailed)` — the round was aborted by `Terminate`
/// - `Err(PoolError::NotStarted | NotReady)` — the round was rejected
/// - `Err(PoolError::Interrupted)` — the pool shut down before finalization
///
/// The handle may be awaited directly (it is a [`Future`]) or via
/// [`wait`](RoundHandle::wait). Dropping it detaches the caller from the
/// round without affecting execution.
pub struct RoundHandle {
    state: HandleState,
}

enum HandleState {
    /// Rejected or empty rounds resolve without a round ever starting.
    Immediate(Option<Result<(), PoolError>>),
    /// A live round resolves through the finalizer's oneshot.
    Pending(oneshot::Receiver<Result<(), PoolError>>),
}

impl RoundHandle {
    /// A handle that is already resolved.
    pub(crate) fn immediate(outcome: Result<(), PoolError>) -> Self {
        Self {
            state: HandleState::Immediate(Some(outcome)),
        }
    }

    /// A handle waiting on the round finalizer.
    pub(crate) fn pending(rx: oneshot::Receiver<Result<(), PoolError>>) -> Self {
        Self {
            state: HandleState::Pending(rx),
        }
    }

    /// Awaits the round outcome.
    ///
    /// Equivalent to awaiting the handle itself; provided for call sites
    /// that read better with an explicit verb.
    pub async fn wait(self) -> Result<(), PoolError> {
        self.await
    }
}

impl Future for RoundHandle {
    type Output = Result<(), PoolError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            HandleState::Immediate(outcome) => {
                Poll::Ready(outcome.take().unwrap_or(Err(PoolError::Interrupted)))
            }
            HandleState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(res) => Poll::Ready(res.unwrap_or(Err(PoolError::Interrupted))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
