//! # Workload: the ordered batch of tasks for one round.
//!
//! [`Workload`] is the caller-facing buffer type: an ordered sequence of
//! [`TaskRef`]s submitted together. The pool owns one pending workload at a
//! time (wrapped in a [`Buffer`] that also tracks staleness for
//! `ClearPolicy::AtNextWorkload`).
//!
//! ## Example
//! ```rust
//! use tickpool::{TaskFn, TaskError, Workload};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut workload = Workload::new();
//! for _ in 0..3 {
//!     workload.push(TaskFn::arc("noop", |_ctx: CancellationToken| async {
//!         Ok::<_, TaskError>(())
//!     }));
//! }
//! assert_eq!(workload.len(), 3);
//! ```

use crate::policies::ClearPolicy;
use crate::tasks::task::TaskRef;

/// Ordered batch of tasks submitted together for one round.
///
/// Order is preserved for partitioning purposes (strided assignment is a
/// function of buffer index), but execution order within a round is
/// unspecified.
#[derive(Default, Clone)]
pub struct Workload {
    tasks: Vec<TaskRef>,
}

impl Workload {
    /// Creates an empty workload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one task.
    pub fn push(&mut self, task: TaskRef) {
        self.tasks.push(task);
    }

    /// Number of tasks in the batch.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Cheap copy of the task handles, in order.
    pub(crate) fn snapshot(&self) -> Vec<TaskRef> {
        self.tasks.clone()
    }
}

impl From<Vec<TaskRef>> for Workload {
    fn from(tasks: Vec<TaskRef>) -> Self {
        Self { tasks }
    }
}

impl FromIterator<TaskRef> for Workload {
    fn from_iter<I: IntoIterator<Item = TaskRef>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl Extend<TaskRef> for Workload {
    fn extend<I: IntoIterator<Item = TaskRef>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}

/// Coordinator-owned pending buffer: the workload plus a staleness mark.
///
/// A buffer is *stale* when it still holds the tasks of an already-finished
/// round under `ClearPolicy::AtNextWorkload`. Staleness is consulted only by
/// [`append`](Buffer::append); a bulk [`replace`](Buffer::replace) always
/// overwrites and clears the mark.
pub(crate) struct Buffer {
    workload: Workload,
    stale: bool,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self {
            workload: Workload::new(),
            stale: false,
        }
    }

    /// Pushes one task, emptying a stale buffer first when the clear policy
    /// is lazy.
    pub(crate) fn append(&mut self, task: TaskRef, clear: ClearPolicy) {
        if self.stale && clear == ClearPolicy::AtNextWorkload {
            self.workload.clear();
        }
        self.stale = false;
        self.workload.push(task);
    }

    /// Replaces the whole workload unconditionally.
    pub(crate) fn replace(&mut self, workload: Workload) {
        self.workload = workload;
        self.stale = false;
    }

    /// Empties the buffer and resets the staleness mark.
    pub(crate) fn clear(&mut self) {
        self.workload.clear();
        self.stale = false;
    }

    /// Marks the buffer as holding tasks from a finished round.
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub(crate) fn len(&self) -> usize {
        self.workload.len()
    }

    pub(crate) fn snapshot(&self) -> Vec<TaskRef> {
        self.workload.snapshot()
    }
}
