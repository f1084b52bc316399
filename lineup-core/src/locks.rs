//! Per-key mutual exclusion.
//!
//! Each key maps to its own mutex, so read-check-write sequences on one
//! lineup are linearized while work on other lineups proceeds in parallel.
//! Slots are created on demand and dropped once nobody holds or waits on them.

use parking_lot::{Mutex, RawMutex};
use parking_lot::lock_api::ArcMutexGuard;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Blocks until the lock for `key` is held by the caller.
    pub fn lock(&self, key: K) -> KeyGuard<'_, K> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let guard = slot.lock_arc();
        KeyGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys with a live slot.
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Releases the key lock when dropped.
pub struct KeyGuard<'a, K>
where
    K: Eq + Hash + Clone,
{
    owner: &'a KeyedLocks<K>,
    key: K,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl<K> Drop for KeyGuard<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        // Unlock before inspecting the slot so the count below only sees
        // the map's own reference plus any waiters.
        drop(self.guard.take());

        let mut slots = self.owner.slots.lock();
        if let Some(slot) = slots.get(&self.key) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(&self.key);
            }
        }
    }
}
