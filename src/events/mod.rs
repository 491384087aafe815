//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the pool and its
//! workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Pool` (start/round/shutdown events), `Worker`
//!   (task failures, worker loss, finalization), `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: the pool's subscriber listener (fans out to
//!   `SubscriberSet`) and any receiver obtained from
//!   [`events`](crate::Pool::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
