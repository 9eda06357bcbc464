use std::collections::HashMap;
use std::hash::Hash;
use tokio::time::{Duration, Instant};

/// Structure for storing a value with its insertion time
struct TimedItem<V> {
    data: V,
    stored_at: Instant,
}

/// Map whose entries expire a fixed time after insertion.
///
/// There is no background timer: expiry is checked lazily on [`TtlMap::get`]
/// and swept in bulk before every [`TtlMap::insert`]. Callers wrap the map in
/// a `tokio::sync::Mutex`.
pub struct TtlMap<K, V> {
    entries: HashMap<K, TimedItem<V>>,
    ttl: Duration,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns a live value, removing the entry if it has expired.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(item) if item.stored_at.elapsed() < self.ttl => return Some(item.data.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Sweeps expired entries, then inserts, replacing any previous value for `key`.
    pub fn insert(&mut self, key: K, data: V) {
        self.sweep();
        self.entries.insert(
            key,
            TimedItem {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, item| item.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
