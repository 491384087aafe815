//! # Clear policies for the workload buffer.
//!
//! [`ClearPolicy`] governs when the pool empties its workload buffer after a
//! round finishes.
//!
//! ## Choosing the right policy
//!
//! **Same batch every tick** (build once, re-run each round):
//! ```text
//! ClearPolicy::Never            → buffer preserved for immediate reuse
//! ```
//!
//! **Fresh batch every tick, built just before the round**:
//! ```text
//! ClearPolicy::UponCompletion   → buffer emptied by the round finalizer
//! ```
//!
//! **Fresh batch every tick, built incrementally as the tick progresses**:
//! ```text
//! ClearPolicy::AtNextWorkload   → buffer marked stale at finalization and
//!                                 emptied lazily by the next append (default)
//! ```
//!
//! Staleness is consulted only by [`append`](crate::Pool::append). A bulk
//! [`set_workload`](crate::Pool::set_workload) always replaces the buffer
//! outright and clears the mark.

/// When the workload buffer is emptied after a completed round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearPolicy {
    /// The buffer is never cleared automatically; the same workload can be
    /// re-run round after round.
    Never,

    /// The round finalizer empties the buffer immediately.
    UponCompletion,

    /// The finalizer marks the buffer stale; the next `append` empties it
    /// before pushing (default).
    AtNextWorkload,
}

impl Default for ClearPolicy {
    /// Returns [`ClearPolicy::AtNextWorkload`].
    fn default() -> Self {
        ClearPolicy::AtNextWorkload
    }
}

impl ClearPolicy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ClearPolicy::Never => "never",
            ClearPolicy::UponCompletion => "upon_completion",
            ClearPolicy::AtNextWorkload => "at_next_workload",
        }
    }
}
