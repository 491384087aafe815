//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per execution. This avoids shared mutable state inside the
//! task itself.
//!
//! ## Concurrency semantics
//! - Each run creates a **new** future owning its own state.
//! - No hidden mutation between rounds; shared state goes through an
//!   explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use tickpool::{TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef = TaskFn::arc("loot-roll", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     // do work...
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "loot-roll");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per execution.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a
    /// [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle (`Arc<dyn Task>`).
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use tickpool::{TaskFn, TaskRef, TaskError};
    ///
    /// let t: TaskRef = TaskFn::arc("noop", |_ctx: CancellationToken| async {
    ///     Ok::<_, TaskError>(())
    /// });
    /// assert_eq!(t.name(), "noop");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
