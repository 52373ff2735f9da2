//! # Tick Scheduler
//!
//! Single-threaded FIFO queue of deferred tasks, drained once per tick.
//!
//! ## Design
//!
//! - A tick runs exactly the tasks that were pending when it started
//! - Tasks may queue more tasks (themselves included); those run next tick
//! - A failing or panicking task is logged and never stops the rest of
//!   the batch

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::error::DataResult;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce(&mut Scheduler) -> DataResult<()> + Send>;

/// Tick-driven task queue.
#[derive(Default)]
pub struct Scheduler {
    /// Tasks for the next tick.
    pending: VecDeque<Task>,
    /// Total ticks executed.
    tick_count: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` for the next tick.
    pub fn queue<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Scheduler) -> DataResult<()> + Send + 'static,
    {
        self.pending.push_back(Box::new(task));
    }

    /// Runs every task pending at the start of the call, in FIFO order.
    ///
    /// Returns the number of tasks run.
    pub fn tick(&mut self) -> usize {
        self.tick_count += 1;
        let batch = std::mem::take(&mut self.pending);
        let count = batch.len();

        for task in batch {
            match panic::catch_unwind(AssertUnwindSafe(|| task(self))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(tick = self.tick_count, "scheduled task failed: {err}"),
                Err(payload) => error!(
                    tick = self.tick_count,
                    "scheduled task panicked: {}",
                    panic_message(payload.as_ref())
                ),
            }
        }
        count
    }

    /// Tasks waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total ticks executed.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Drops every pending task.
    pub fn terminate(&mut self) {
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            debug!(dropped, "scheduler terminated with pending tasks");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}
