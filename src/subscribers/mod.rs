//! # Event subscribers for the pool runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver events broadcast through the
//! [`Bus`](crate::events::Bus) without blocking the publishers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Pool/Worker ── publish(Event) ──► Bus ──► subscriber listener
//!                                                │
//!                                                ▼
//!                                          SubscriberSet
//!                                     ┌─────────┼─────────┐
//!                                     ▼         ▼         ▼
//!                                 LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use tickpool::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFailed {
//!             // increment failure counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
