//! # Partition strategies for dividing a round among workers.
//!
//! [`Partition`] determines how the indices of a round's task snapshot are
//! assigned to workers. Both strategies cover every task exactly once; they
//! differ in contention and load balance.
//!
//! ## Choosing the right strategy
//!
//! **Uniform task costs** (every task takes about as long):
//! ```text
//! Partition::Strided        → zero cross-worker contention,
//!                             deterministic, reproducible assignment
//! ```
//!
//! **Uneven task costs** (a few tasks dominate):
//! ```text
//! Partition::SharedCursor   → workers claim the next index dynamically,
//!                             balancing load at the price of one shared counter
//! ```

/// Strategy for assigning task indices to workers within one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    /// Static assignment: worker `i` visits indices `i, i+N, i+2N, …` for a
    /// pool of `N` workers (default).
    ///
    /// No shared state between workers; load may be uneven when task costs
    /// vary.
    Strided,

    /// Dynamic assignment: workers repeatedly claim the next index from one
    /// shared atomic cursor until it passes the end of the snapshot.
    ///
    /// Balances uneven task costs; all workers contend on a single counter.
    SharedCursor,
}

impl Default for Partition {
    /// Returns [`Partition::Strided`].
    fn default() -> Self {
        Partition::Strided
    }
}

impl Partition {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Partition::Strided => "strided",
            Partition::SharedCursor => "shared_cursor",
        }
    }
}
