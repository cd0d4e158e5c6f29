//! Cache Store Module
//!
//! Authoritative key to entry mapping. The store is always used behind the
//! cache's single mutex; every method here runs inside that exclusive section.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::cache::entry::{CacheEntry, EntrySnapshot};

/// The store behind the cache's exclusive-access section.
pub(crate) type SharedStore<K, V> = Arc<Mutex<CacheStore<K, V>>>;

/// Non-owning reference held by background tasks.
pub(crate) type WeakStore<K, V> = Weak<Mutex<CacheStore<K, V>>>;

// == Cache Store ==
/// Key to entry mapping plus the generation counter.
#[derive(Debug)]
pub(crate) struct CacheStore<K, V> {
    /// Live entries
    entries: HashMap<K, CacheEntry<V>>,
    /// Last generation handed out. Shared by all keys, so generations of
    /// any single key are strictly increasing even across removals.
    last_generation: u64,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            last_generation: 0,
        }
    }

    // == Generation ==
    /// Hands out a generation newer than any issued before.
    pub fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    // == Get ==
    /// Returns the live value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Returns true if `key` has a live entry.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Describes the live entry for `key`.
    pub fn snapshot(&self, key: &K) -> Option<EntrySnapshot> {
        self.entries.get(key).map(CacheEntry::snapshot)
    }

    // == Put ==
    /// Installs `entry` under `key`, cancelling the outgoing entry's work.
    pub fn put(&mut self, key: K, entry: CacheEntry<V>) {
        if let Some(previous) = self.entries.insert(key, entry) {
            previous.cancel();
        }
    }

    // == Take ==
    /// Removes and returns the entry for `key` with its work cancelled.
    pub fn take(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        entry.cancel();
        Some(entry)
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns false if there was none.
    pub fn delete(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    // == Keys ==
    /// Snapshot of the live keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    // == Clear ==
    /// Cancels every entry's work and empties the store.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        for (_, entry) in self.entries.drain() {
            entry.cancel();
        }
        count
    }

    // == Fenced Operations ==
    /// Removes `key` only if its live generation is still `generation`.
    pub fn remove_if_current(&mut self, key: &K, generation: u64) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.generation == generation => {
                self.entries.remove(key);
                true
            }
            _ => {
                debug!("Ignoring stale expiration for {:?} (generation {})", key, generation);
                false
            }
        }
    }

    /// Replaces the value of `key` with `update(&value)` only if its live
    /// generation is still `generation`. The generation is left unchanged.
    pub fn update_if_current<F>(&mut self, key: &K, generation: u64, update: F) -> bool
    where
        F: FnOnce(&V) -> V,
    {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                entry.value = update(&entry.value);
                trace!("Updated {:?} (generation {})", key, generation);
                true
            }
            _ => {
                debug!("Ignoring stale update for {:?} (generation {})", key, generation);
                false
            }
        }
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
