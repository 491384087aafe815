//! # Pool status: an explicit five-state machine.
//!
//! [`Status`] is the single coordinator-wide state value. Transitions:
//!
//! ```text
//! Stopped ──start──► Starting ──workers spawned──► Ready
//!                                                   │ ▲
//!                                   process_workload│ │finalizer
//!                                                   ▼ │
//!                                               Processing ──Terminate──► Error
//!                                                                           │
//!                                            Ready ◄──────clear_errors──────┘
//! ```
//!
//! ## Rules
//! - Exactly one status value exists per pool at any instant.
//! - `Error` is **sticky**: set by the `Terminate` policy during a round, it
//!   survives finalization and is left only by an explicit
//!   [`clear_errors`](crate::Pool::clear_errors).
//! - All transitions go through guarded compare-and-set
//!   ([`StatusCell::transition`]) so concurrent workers can never downgrade
//!   an `Error`.
//!
//! The cell is backed by a `tokio::sync::watch` channel: blocking waiters
//! ([`wait_idle`](StatusCell::wait_idle)) observe every transition without
//! polling and without lost wake-ups.

use std::fmt;

use tokio::sync::watch;

/// Coordinator-wide pool state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Constructed, workers not yet spawned (also the terminal state after
    /// shutdown).
    Stopped,
    /// `start` is spawning workers.
    Starting,
    /// Workers are idle; a round may begin.
    Ready,
    /// A round is in flight.
    Processing,
    /// A round was aborted by the `Terminate` policy; sticky until
    /// acknowledged.
    Error,
}

impl Status {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Starting => "starting",
            Status::Ready => "ready",
            Status::Processing => "processing",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Shared status cell with guarded transitions and awaitable waits.
#[derive(Debug)]
pub(crate) struct StatusCell {
    tx: watch::Sender<Status>,
}

impl StatusCell {
    /// Creates a cell in [`Status::Stopped`].
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Status::Stopped);
        Self { tx }
    }

    /// Current value.
    pub(crate) fn get(&self) -> Status {
        *self.tx.borrow()
    }

    /// Unconditional transition. Reserved for the coordinator's own
    /// lifecycle steps (`start`, empty-round rollback, shutdown).
    pub(crate) fn set(&self, status: Status) {
        self.tx.send_replace(status);
    }

    /// Guarded compare-and-set: moves `from → to` atomically, returns
    /// whether the transition happened.
    ///
    /// This is the only way workers touch the status, which is what keeps
    /// `Error` sticky: a finalizer attempting `Processing → Ready` simply
    /// fails when a `Terminate` already moved the pool to `Error`.
    pub(crate) fn transition(&self, from: Status, to: Status) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == from {
                *current = to;
                true
            } else {
                false
            }
        })
    }

    /// Waits until the status is anything but [`Status::Processing`].
    ///
    /// Returns immediately when no round is in flight.
    pub(crate) async fn wait_idle(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|status| *status != Status::Processing).await;
    }
}
