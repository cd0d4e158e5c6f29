//! Cache Facade
//!
//! Public operations composing the entry store with the expiration and update
//! schedulers. Every operation runs inside the store's single exclusive-access
//! section: it decides the entry's new generation, cancels the outgoing
//! entry's work and installs the new work before the lock is released.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::entry::{CacheEntry, EntrySnapshot, Schedule};
use crate::cache::{CacheStore, SharedStore};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_expiration_task, spawn_update_task, UpdateFn};

/// Schedule requested for a newly installed entry.
enum Plan<V> {
    Permanent,
    Expire(Duration),
    Update(Duration, UpdateFn<V>),
}

// == Cache ==
/// A thread-safe key/value cache with per-entry TTLs and self-updating values.
///
/// Cloning a `Cache` yields another handle to the same entries. Background
/// tasks only hold a weak reference, so once the last handle is dropped every
/// pending expiration and update task is aborted.
///
/// Operations that schedule work spawn tokio tasks and must run inside a
/// tokio runtime.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use expiring_cache::{update_fn, Cache};
///
/// #[tokio::main]
/// async fn main() {
///     let cache: Cache<String, u64> = Cache::new();
///
///     cache.store("hits".to_string(), 0).await.unwrap();
///     cache
///         .store_with_expiration("session".to_string(), 7, Duration::from_secs(60))
///         .await
///         .unwrap();
///     cache
///         .store_with_update(
///             "ticker".to_string(),
///             0,
///             Some(update_fn(|v: &u64| v + 1)),
///             Duration::from_secs(1),
///         )
///         .await
///         .unwrap();
///
///     assert_eq!(cache.get(&"hits".to_string()).await.unwrap(), 0);
///     assert_eq!(cache.len().await, 3);
/// }
/// ```
pub struct Cache<K, V> {
    store: SharedStore<K, V>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::new())),
        }
    }

    // == Store ==
    /// Stores a permanent entry.
    ///
    /// Fails with `KeyExists` if `key` already has a live entry.
    pub async fn store(&self, key: K, value: V) -> Result<()> {
        let mut store = self.store.lock().await;
        if store.contains(&key) {
            return Err(CacheError::key_exists(&key));
        }
        debug!("Storing {:?}", key);
        self.install(&mut store, key, value, Plan::Permanent);
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the current value. Reading never removes the entry.
    pub async fn get(&self, key: &K) -> Result<V> {
        let store = self.store.lock().await;
        store
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::key_not_found(key))
    }

    // == Remove ==
    /// Cancels the entry's schedule and deletes it.
    pub async fn remove(&self, key: &K) -> Result<()> {
        let mut store = self.store.lock().await;
        if !store.delete(key) {
            return Err(CacheError::key_not_found(key));
        }
        debug!("Removed {:?}", key);
        Ok(())
    }

    // == Replace ==
    /// Replaces the entry with a permanent one holding `value`.
    ///
    /// Any TTL or update task of the previous entry is cancelled.
    pub async fn replace(&self, key: K, value: V) -> Result<()> {
        let mut store = self.store.lock().await;
        store
            .take(&key)
            .ok_or_else(|| CacheError::key_not_found(&key))?;
        debug!("Replacing {:?}", key);
        self.install(&mut store, key, value, Plan::Permanent);
        Ok(())
    }

    // == Clear ==
    /// Cancels every schedule and removes every entry.
    pub async fn clear(&self) {
        let removed = self.store.lock().await.clear();
        debug!("Cleared {} entries", removed);
    }

    // == Keys ==
    /// Snapshot of the live keys, in no particular order.
    pub async fn keys(&self) -> Vec<K> {
        self.store.lock().await.keys()
    }

    // == Store With Expiration ==
    /// Stores an entry that is removed once `ttl` has elapsed.
    ///
    /// Fails with `NonPositivePeriod` if `ttl` is zero, or `KeyExists` if
    /// `key` already has a live entry.
    pub async fn store_with_expiration(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        check_period(ttl)?;
        let mut store = self.store.lock().await;
        if store.contains(&key) {
            return Err(CacheError::key_exists(&key));
        }
        debug!("Storing {:?} with ttl {:?}", key, ttl);
        self.install(&mut store, key, value, Plan::Expire(ttl));
        Ok(())
    }

    // == Replace With Expiration ==
    /// Replaces the entry with `value`, removed once `ttl` has elapsed.
    pub async fn replace_with_expiration(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        check_period(ttl)?;
        let mut store = self.store.lock().await;
        store
            .take(&key)
            .ok_or_else(|| CacheError::key_not_found(&key))?;
        debug!("Replacing {:?} with ttl {:?}", key, ttl);
        self.install(&mut store, key, value, Plan::Expire(ttl));
        Ok(())
    }

    // == Expire ==
    /// Keeps the current value and (re)starts its TTL at `ttl`.
    ///
    /// Any previous TTL is discarded. An entry that was self-updating stops
    /// updating and becomes an expiring entry holding its latest value.
    pub async fn expire(&self, key: &K, ttl: Duration) -> Result<()> {
        check_period(ttl)?;
        let mut store = self.store.lock().await;
        let previous = store
            .take(key)
            .ok_or_else(|| CacheError::key_not_found(key))?;
        debug!("Expiring {:?} in {:?}", key, ttl);
        self.install(&mut store, key.clone(), previous.value, Plan::Expire(ttl));
        Ok(())
    }

    // == Store With Update ==
    /// Stores `init` and replaces it with `update(&value)` every `interval`.
    ///
    /// Fails with `NilUpdateFunc` if `update` is `None`, `NonPositivePeriod`
    /// if `interval` is zero, or `KeyExists` if `key` already has a live entry.
    pub async fn store_with_update(
        &self,
        key: K,
        init: V,
        update: Option<UpdateFn<V>>,
        interval: Duration,
    ) -> Result<()> {
        let update = update.ok_or(CacheError::NilUpdateFunc)?;
        check_period(interval)?;
        let mut store = self.store.lock().await;
        if store.contains(&key) {
            return Err(CacheError::key_exists(&key));
        }
        debug!("Storing {:?} updating every {:?}", key, interval);
        self.install(&mut store, key, init, Plan::Update(interval, update));
        Ok(())
    }

    // == Replace With Update ==
    /// Replaces the entry with `init`, updated every `interval` by `update`.
    ///
    /// The previous entry's TTL or update task is cancelled.
    pub async fn replace_with_update(
        &self,
        key: K,
        init: V,
        update: Option<UpdateFn<V>>,
        interval: Duration,
    ) -> Result<()> {
        let update = update.ok_or(CacheError::NilUpdateFunc)?;
        check_period(interval)?;
        let mut store = self.store.lock().await;
        store
            .take(&key)
            .ok_or_else(|| CacheError::key_not_found(&key))?;
        debug!("Replacing {:?} updating every {:?}", key, interval);
        self.install(&mut store, key, init, Plan::Update(interval, update));
        Ok(())
    }

    // == Inspection ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if `key` has a live entry.
    pub async fn contains_key(&self, key: &K) -> bool {
        self.store.lock().await.contains(key)
    }

    /// Describes the live entry for `key`: its generation and schedule.
    pub async fn describe(&self, key: &K) -> Result<EntrySnapshot> {
        self.store
            .lock()
            .await
            .snapshot(key)
            .ok_or_else(|| CacheError::key_not_found(key))
    }

    // == Install ==
    /// Puts a fresh incarnation of `key` into `store` and starts its work.
    /// Must be called with the lock held and any previous entry cancelled.
    fn install(&self, store: &mut CacheStore<K, V>, key: K, value: V, plan: Plan<V>) {
        let generation = store.next_generation();
        let schedule = match plan {
            Plan::Permanent => Schedule::Permanent,
            Plan::Expire(ttl) => Schedule::Expiring {
                ttl,
                scheduled_at: Instant::now(),
                work: spawn_expiration_task(
                    Arc::downgrade(&self.store),
                    key.clone(),
                    generation,
                    ttl,
                ),
            },
            Plan::Update(interval, update) => Schedule::Updating {
                interval,
                work: spawn_update_task(
                    Arc::downgrade(&self.store),
                    key.clone(),
                    generation,
                    interval,
                    update,
                ),
            },
        };
        store.put(key, CacheEntry::new(value, generation, schedule));
    }
}

/// Rejects zero durations.
fn check_period(period: Duration) -> Result<()> {
    if period.is_zero() {
        return Err(CacheError::NonPositivePeriod(period));
    }
    Ok(())
}
