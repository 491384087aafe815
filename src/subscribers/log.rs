//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [pool-started] workers=4
//! [round-started] round=1 tasks=10
//! [task-failed] round=1 task=corpse-decay err="missing loot table"
//! [round-completed] round=1
//! [round-failed] round=2 err="task 'spawner': execution failed: boom"
//! [worker-lost] worker=3 task=spawner err="boom"
//! [shutdown-requested]
//! [grace-exceeded]
//! [pool-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new stdout logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::PoolStarted => {
                println!("[pool-started] workers={:?}", e.count);
            }
            EventKind::RoundStarted => {
                println!("[round-started] round={:?} tasks={:?}", e.round, e.count);
            }
            EventKind::TaskFailed => {
                println!(
                    "[task-failed] round={:?} task={:?} err={:?}",
                    e.round, e.task, e.reason
                );
            }
            EventKind::RoundCompleted => {
                println!("[round-completed] round={:?}", e.round);
            }
            EventKind::RoundFailed => {
                println!("[round-failed] round={:?} err={:?}", e.round, e.reason);
            }
            EventKind::WorkerLost => {
                println!(
                    "[worker-lost] worker={:?} task={:?} err={:?}",
                    e.worker, e.task, e.reason
                );
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            EventKind::PoolStopped => {
                println!("[pool-stopped]");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] sub={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] sub={:?} info={:?}", e.task, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
