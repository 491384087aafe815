//! # Error policies for task failures within a round.
//!
//! [`ErrorPolicy`] decides what a worker does when a task returns an error.
//! The worker never unwinds: every task invocation yields a
//! `Result<(), TaskError>` and the policy inspects the value.
//!
//! ## Choosing the right policy
//!
//! **Trusted tasks** (failure indicates a broken build, not bad data):
//! ```text
//! ErrorPolicy::Propagate    → failure is fatal to the worker; the round
//!                             never finalizes (no recovery)
//! ```
//!
//! **Best-effort rounds** (failures are expected and uninteresting):
//! ```text
//! ErrorPolicy::Ignore       → failure discarded, round finishes
//! ```
//!
//! **Observable rounds** (failures are expected and worth keeping):
//! ```text
//! ErrorPolicy::Log          → failure captured + TaskFailed event,
//!                             round finishes (default)
//! ```
//!
//! **All-or-nothing rounds** (one failure invalidates the batch):
//! ```text
//! ErrorPolicy::Terminate    → failure captured, status goes Error (sticky),
//!                             workers stop claiming at the next boundary
//! ```
//!
//! Cancellation ([`TaskError::Canceled`](crate::TaskError::Canceled)) is a
//! graceful stop, not a failure — no policy ever sees it.

/// Disposition of a task failure during a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Fatal: the worker publishes `WorkerLost` and leaves its run loop
    /// permanently, without decrementing the active counter.
    ///
    /// The round never finalizes and its handle resolves only when the pool
    /// shuts down. Use only when tasks are trusted never to fail.
    Propagate,

    /// Failure is discarded; the worker proceeds to its next task.
    Ignore,

    /// Failure is appended to the error list, a `TaskFailed` event is
    /// published, and the worker proceeds (default).
    Log,

    /// Failure is appended to the error list, a `TaskFailed` event is
    /// published, and the pool status is moved to `Error` (sticky).
    ///
    /// Workers stop claiming tasks at their next claim boundary; tasks
    /// already executing run to completion. The round's handle resolves with
    /// the first captured failure.
    Terminate,
}

impl Default for ErrorPolicy {
    /// Returns [`ErrorPolicy::Log`].
    fn default() -> Self {
        ErrorPolicy::Log
    }
}

impl ErrorPolicy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorPolicy::Propagate => "propagate",
            ErrorPolicy::Ignore => "ignore",
            ErrorPolicy::Log => "log",
            ErrorPolicy::Terminate => "terminate",
        }
    }
}
