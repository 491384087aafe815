//! # tickpool
//!
//! **Tickpool** is a round-based worker pool library for Rust.
//!
//! It provides a fixed-size pool that executes discrete *rounds* of
//! independent, argument-less tasks in parallel, with deterministic
//! completion signaling and configurable partitioning, error-handling, and
//! buffer-clearing policies. The crate is designed as a building block for
//! simulation servers that fan out a batch of per-entity updates once per
//! tick.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │ (unit #1)    │   │ (unit #2)    │   │ (unit #M)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Pool (round coordinator)                                         │
//! │  - Workload buffer (pending tasks + staleness mark)               │
//! │  - Status state machine (Stopped/Starting/Ready/Processing/Error) │
//! │  - Round channel (snapshot + cursor + active counter + failures)  │
//! │  - Bus (broadcast events) → SubscriberSet (fan-out)               │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 0   │   │   Worker 1   │   │  Worker N-1  │
//!     │ (claim loop) │   │ (claim loop) │   │ (claim loop) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Publishes        │ Publishes        │ Publishes
//!      │ - TaskFailed     │ - TaskFailed     │ - RoundCompleted
//!      │ - WorkerLost     │ - ...            │   (finalizer)
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Round lifecycle
//! ```text
//! Pool::start() ─► spawn N workers ─► Ready
//!
//! loop (one round per tick) {
//!   ├─► fill buffer: append(task) / set_workload(workload, wait_first)
//!   ├─► process_workload() ─► Ready→Processing, snapshot buffer,
//!   │                         wake workers, return RoundHandle
//!   ├─► workers drain the snapshot under the Partition strategy,
//!   │   each task wrapped by the ErrorPolicy
//!   ├─► last worker finalizes: ClearPolicy disposition,
//!   │                          Processing→Ready (Error is sticky),
//!   │                          resolve RoundHandle
//!   └─► caller: handle.await  (or wait_for_finished().await)
//! }
//!
//! Pool::shutdown() ─► wait (grace) ─► cancel ─► join workers ─► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                        |
//! |-------------------|----------------------------------------------------------------------|-------------------------------------------|
//! | **Tasks**         | Define units of round work as trait impls or closures.               | [`Task`], [`TaskFn`], [`TaskRef`]         |
//! | **Workloads**     | Ordered batches submitted together for one round.                    | [`Workload`]                              |
//! | **Policies**      | Partitioning, failure disposition, buffer clearing.                  | [`Partition`], [`ErrorPolicy`], [`ClearPolicy`] |
//! | **Coordination**  | Start rounds, await results, observe status.                         | [`Pool`], [`RoundHandle`], [`Status`]     |
//! | **Errors**        | Typed errors for pool misuse and task failures.                      | [`PoolError`], [`TaskError`], [`TaskFailure`] |
//! | **Observability** | Hook into pool lifecycle events (logging, metrics, custom).          | [`Subscribe`], [`Event`], [`EventKind`]   |
//! | **Configuration** | Centralize construction-time settings.                               | [`PoolConfig`]                            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use tickpool::{Pool, PoolConfig, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = PoolConfig::default();
//!     cfg.workers = 4;
//!
//!     let pool = Pool::new(cfg);
//!     pool.start();
//!
//!     let updated = Arc::new(AtomicUsize::new(0));
//!     for _ in 0..16 {
//!         let updated = Arc::clone(&updated);
//!         let task: TaskRef = TaskFn::arc("entity-update", move |_ctx: CancellationToken| {
//!             let updated = Arc::clone(&updated);
//!             async move {
//!                 updated.fetch_add(1, Ordering::Relaxed);
//!                 Ok::<_, TaskError>(())
//!             }
//!         });
//!         pool.append(task)?;
//!     }
//!
//!     pool.process_workload().await?;
//!     assert_eq!(updated.load(Ordering::Relaxed), 16);
//!
//!     pool.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::PoolConfig;
pub use core::{Pool, PoolBuilder, RoundHandle, Status};
pub use error::{PoolError, TaskError, TaskFailure};
pub use events::{Bus, Event, EventKind};
pub use policies::{ClearPolicy, ErrorPolicy, Partition};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskFn, TaskRef, Workload};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
