//! # Pool builder.
//!
//! [`PoolBuilder`] assembles a [`Pool`] from a [`PoolConfig`] plus optional
//! event subscribers. Obtained via [`Pool::builder`].

use std::sync::Arc;

use crate::config::PoolConfig;
use crate::core::pool::Pool;
use crate::subscribers::Subscribe;

/// Builder for constructing a pool with optional observability.
pub struct PoolBuilder {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub(crate) fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pool events (round lifecycle, task failures,
    /// shutdown) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the pool.
    ///
    /// Workers are not spawned yet; call [`Pool::start`] from within a Tokio
    /// runtime.
    pub fn build(self) -> Pool {
        Pool::assemble(self.cfg, self.subscribers)
    }
}
