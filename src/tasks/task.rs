//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable). The common
//! handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing
//! across rounds.
//!
//! A task takes no domain input and produces no domain output; it either
//! succeeds or fails. The [`CancellationToken`] it receives is shutdown
//! context only: a long task should check it to exit promptly when the pool
//! is torn down. Round-level cancellation is observed by workers between
//! tasks, never inside one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task (`Arc<dyn Task>`).
pub type TaskRef = Arc<dyn Task>;

/// # One unit of round work.
///
/// A `Task` has a stable [`name`](Task::name) and an async
/// [`run`](Task::run) method that receives a [`CancellationToken`].
/// Implementors should regularly check cancellation and exit promptly during
/// shutdown, returning [`TaskError::Canceled`].
///
/// Tasks in one round must be independent: the pool guarantees each runs
/// exactly once but guarantees nothing about their relative order.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use tickpool::{Task, TaskError};
///
/// struct EntityUpdate;
///
/// #[async_trait]
/// impl Task for EntityUpdate {
///     fn name(&self) -> &str { "entity-update" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` and exit quickly to
    /// honor graceful shutdown.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
