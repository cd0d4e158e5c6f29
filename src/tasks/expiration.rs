//! TTL Expiration Task
//!
//! One-shot task that removes an entry once its TTL has elapsed, provided the
//! entry is still the incarnation it was scheduled for.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tracing::debug;

use crate::cache::WeakStore;
use crate::tasks::ScheduledWork;

/// Spawns the expiration task for `key` at `generation`.
///
/// The task sleeps for `ttl`, then takes the store lock and deletes the entry
/// only if its live generation still equals `generation`. It exits silently
/// if the store has been dropped.
pub(crate) fn spawn_expiration_task<K, V>(
    store: WeakStore<K, V>,
    key: K,
    generation: u64,
    ttl: Duration,
) -> ScheduledWork
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + 'static,
{
    ScheduledWork::new(tokio::spawn(async move {
        tokio::time::sleep(ttl).await;

        let Some(store) = store.upgrade() else {
            return;
        };
        let mut guard = store.lock().await;
        if guard.remove_if_current(&key, generation) {
            debug!("Expired {:?} after {:?}", key, ttl);
        }
    }))
}
