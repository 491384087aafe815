//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the construction-time settings for a [`Pool`](crate::Pool).
//!
//! ## Sentinel values
//! - `workers = 0` → one worker per available CPU
//! - `bus_capacity` below 1 is clamped to 1 by the bus

use std::time::Duration;

use crate::policies::{ClearPolicy, ErrorPolicy, Partition};

/// Construction-time configuration for a pool.
///
/// Defines:
/// - **Pool shape**: worker count (fixed for the pool's lifetime)
/// - **Round behavior**: partition strategy, error policy, clear policy
/// - **Event system**: bus capacity for event delivery
/// - **Shutdown behavior**: grace period for an in-flight round
///
/// ## Field semantics
/// - `workers`: number of worker tasks (`0` = one per CPU)
/// - `partition`: how a round's tasks are divided among workers
/// - `on_failure`: what happens when a task returns an error
/// - `clear`: when the workload buffer is emptied
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
/// - `grace`: how long `shutdown` waits for an in-flight round
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of workers to spawn at [`start`](crate::Pool::start).
    ///
    /// - `0` = one worker per available CPU
    /// - `n > 0` = exactly `n` workers
    ///
    /// Fixed at construction; the pool never grows or shrinks.
    pub workers: usize,

    /// Strategy for dividing a round's tasks among workers.
    pub partition: Partition,

    /// Disposition of task failures during a round.
    pub on_failure: ErrorPolicy,

    /// When the workload buffer is emptied after a round.
    pub clear: ClearPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Maximum time [`shutdown`](crate::Pool::shutdown) waits for an
    /// in-flight round before cancelling the workers.
    pub grace: Duration,
}

impl PoolConfig {
    /// Resolves the configured worker count.
    ///
    /// - `0` → one worker per available CPU (at least 1)
    /// - `n > 0` → `n`
    #[inline]
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `workers = 0` (one per CPU)
    /// - `partition = Partition::Strided` (contention-free)
    /// - `on_failure = ErrorPolicy::Log` (capture and continue)
    /// - `clear = ClearPolicy::AtNextWorkload` (lazy reset)
    /// - `bus_capacity = 1024` (good baseline)
    /// - `grace = 30s` (reasonable shutdown window)
    fn default() -> Self {
        Self {
            workers: 0,
            partition: Partition::default(),
            on_failure: ErrorPolicy::default(),
            clear: ClearPolicy::default(),
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}
