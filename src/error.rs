//! Error types used by the pool runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`PoolError`] — errors raised by the pool itself: rejected operations,
//!   failed rounds, and shutdown problems.
//! - [`TaskError`] — errors raised by individual task executions.
//!
//! Both types provide `as_label` helpers for logging/metrics. A captured
//! task failure together with the name of the task that produced it is
//! recorded as a [`TaskFailure`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::Status;

/// # Errors produced by the pool runtime.
///
/// These cover rejected operations (contract violations surfaced as explicit
/// results instead of silent races), failed rounds, and shutdown problems.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum PoolError {
    /// A round was requested before [`start`](crate::Pool::start) spawned the workers.
    #[error("pool has not been started")]
    NotStarted,

    /// A round was requested while the pool was unable to accept one.
    ///
    /// Raised while a round is already in flight, or while the pool sits in a
    /// sticky [`Status::Error`] that has not been acknowledged via
    /// [`clear_errors`](crate::Pool::clear_errors).
    #[error("pool is not ready for a round (status: {status})")]
    NotReady {
        /// The status observed when the round was rejected.
        status: Status,
    },

    /// The workload buffer was mutated while a round was in flight.
    #[error("workload buffer is locked by a round in flight")]
    Busy,

    /// The round was aborted by the `Terminate` error policy.
    ///
    /// Carries the first failure captured during the round; the full list is
    /// available through [`task_errors`](crate::Pool::task_errors).
    #[error("round aborted: {failure}")]
    RoundFailed {
        /// The first captured task failure.
        failure: TaskFailure,
    },

    /// The round was torn down before it could finalize.
    ///
    /// Observed on a [`RoundHandle`](crate::RoundHandle) when the pool shuts
    /// down while the round is still open — typically after a worker was lost
    /// to the `Propagate` error policy.
    #[error("round interrupted before finalization")]
    Interrupted,

    /// Shutdown grace period elapsed with a round still in flight.
    #[error("shutdown grace {grace:?} exceeded with a round still in flight")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickpool::PoolError;
    ///
    /// assert_eq!(PoolError::Busy.as_label(), "pool_busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::NotStarted => "pool_not_started",
            PoolError::NotReady { .. } => "pool_not_ready",
            PoolError::Busy => "pool_busy",
            PoolError::RoundFailed { .. } => "round_failed",
            PoolError::Interrupted => "round_interrupted",
            PoolError::GraceExceeded { .. } => "grace_exceeded",
        }
    }
}

/// # Errors produced by task execution.
///
/// A task either fails with a message or reports that it observed
/// cancellation and exited early. Cancellation is a graceful stop: it is
/// never recorded as a failure and never fed to the error policy.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed shutdown cancellation and exited early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from any displayable error.
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// One captured task failure: which task failed and how.
///
/// Collected into the pool's error list under the `Log` and `Terminate`
/// error policies; snapshots are returned by
/// [`task_errors`](crate::Pool::task_errors).
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// Name of the task that failed.
    pub task: Arc<str>,
    /// The error it returned.
    pub error: TaskError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}': {}", self.task, self.error)
    }
}
