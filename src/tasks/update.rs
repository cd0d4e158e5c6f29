//! Self-Update Task
//!
//! Recurring task that recomputes an entry's value on a fixed interval until
//! the entry is replaced, removed, or the store goes away.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::cache::WeakStore;
use crate::tasks::ScheduledWork;

/// Caller-supplied function computing an entry's next value from its current one.
///
/// Calls for one key never overlap. A panicking function is not caught: it
/// unwinds its update task, which stops updating the entry.
pub type UpdateFn<V> = Arc<dyn Fn(&V) -> V + Send + Sync>;

/// Wraps a closure as an [`UpdateFn`].
///
/// # Example
/// ```
/// use expiring_cache::update_fn;
///
/// let increment = update_fn(|v: &u64| v + 1);
/// assert_eq!(increment(&41), 42);
/// ```
pub fn update_fn<V, F>(f: F) -> UpdateFn<V>
where
    F: Fn(&V) -> V + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Spawns the update task for `key` at `generation`.
///
/// Every `interval` the task takes the store lock and, if the entry is still
/// at `generation`, stores `update(&value)` in place. The first stale tick
/// ends the task for good.
pub(crate) fn spawn_update_task<K, V>(
    store: WeakStore<K, V>,
    key: K,
    generation: u64,
    interval: Duration,
    update: UpdateFn<V>,
) -> ScheduledWork
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + 'static,
{
    ScheduledWork::new(tokio::spawn(async move {
        let now = Instant::now();
        let start = now.checked_add(interval).unwrap_or_else(|| far_future(now));
        let mut ticker = interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(shared) = store.upgrade() else {
                break;
            };
            let mut guard = shared.lock().await;
            if !guard.update_if_current(&key, generation, |value| update(value)) {
                break;
            }
        }

        debug!("Update task for {:?} (generation {}) stopped", key, generation);
    }))
}

/// A deadline the task will never reach, for intervals past `Instant`'s range.
fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(86_400 * 365 * 30)
}
