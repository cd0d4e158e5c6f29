//! Background Tasks Module
//!
//! Per-entry background work scheduled by the cache.
//!
//! # Tasks
//! - Expiration: removes an entry once its TTL has elapsed
//! - Update: recomputes an entry's value on a fixed interval
//!
//! Every task is owned by exactly one entry through a [`ScheduledWork`]
//! handle and holds only a weak reference to the store.

mod expiration;
mod update;

use tokio::task::JoinHandle;

pub(crate) use expiration::spawn_expiration_task;
pub(crate) use update::spawn_update_task;
pub use update::{update_fn, UpdateFn};

// == Scheduled Work ==
/// Cancellable handle to an entry's background task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub(crate) struct ScheduledWork {
    handle: JoinHandle<()>,
}

impl ScheduledWork {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stops the task. Calling this more than once is a no-op.
    pub(crate) fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns true once the task has stopped, whether it finished or was cancelled.
    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledWork {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
