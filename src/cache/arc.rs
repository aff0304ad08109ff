//! Adaptive Replacement Cache
//!
//! Four LRU lists as in Megiddo & Modha:
//! - `t1`: entries seen once recently
//! - `t2`: entries seen at least twice
//! - `b1` / `b2`: ghost keys recently evicted from `t1` / `t2`
//!
//! A hit on a ghost key moves the target size `p` of `t1`, so the cache
//! shifts between favoring recency and favoring frequency on its own.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

pub struct ArcCache<K: Hash + Eq, V> {
    state: Mutex<ArcState<K, V>>,
}

struct ArcState<K: Hash + Eq, V> {
    capacity: usize,
    /// Target size of `t1`.
    p: usize,
    t1: LruCache<K, V>,
    t2: LruCache<K, V>,
    b1: LruCache<K, ()>,
    b2: LruCache<K, ()>,
}

impl<K, V> ArcCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(ArcState {
                capacity: capacity.get(),
                p: 0,
                t1: LruCache::unbounded(),
                t2: LruCache::unbounded(),
                b1: LruCache::new(capacity),
                b2: LruCache::new(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Look up a key, promoting it to the frequent list on a hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();

        if let Some((k, v)) = state.t1.pop_entry(key) {
            state.t2.put(k, v.clone());
            return Some(v);
        }

        state.t2.get(key).cloned()
    }

    /// Read without touching recency or frequency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let state = self.state.lock();
        state
            .t1
            .peek(key)
            .or_else(|| state.t2.peek(key))
            .cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let state = self.state.lock();
        state.t1.contains(key) || state.t2.contains(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.state.lock().insert(key, value);
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        state.b1.pop(key);
        state.b2.pop(key);
        match state.t1.pop(key) {
            Some(v) => Some(v),
            None => state.t2.pop(key),
        }
    }

    /// Number of live (non-ghost) entries.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.t1.len() + state.t2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.t1.clear();
        state.t2.clear();
        state.b1.clear();
        state.b2.clear();
        state.p = 0;
    }
}

impl<K, V> ArcState<K, V>
where
    K: Hash + Eq + Clone,
{
    fn insert(&mut self, key: K, value: V) {
        // Already live: refresh and count as a second use.
        if self.t1.pop(&key).is_some() || self.t2.contains(&key) {
            self.t2.put(key, value);
            return;
        }

        // Recency ghost hit: t1 deserved more room.
        if self.b1.contains(&key) {
            let delta = if self.b2.len() > self.b1.len() {
                self.b2.len() / self.b1.len()
            } else {
                1
            };
            self.p = (self.p + delta).min(self.capacity);

            if self.live_len() >= self.capacity {
                self.replace(false);
            }
            self.b1.pop(&key);
            self.t2.put(key, value);
            return;
        }

        // Frequency ghost hit: t2 deserved more room.
        if self.b2.contains(&key) {
            let delta = if self.b1.len() > self.b2.len() {
                self.b1.len() / self.b2.len()
            } else {
                1
            };
            self.p = self.p.saturating_sub(delta);

            if self.live_len() >= self.capacity {
                self.replace(true);
            }
            self.b2.pop(&key);
            self.t2.put(key, value);
            return;
        }

        if self.live_len() >= self.capacity {
            self.replace(false);
        }

        // Keep the ghost lists within their share of the directory.
        if self.b1.len() > self.capacity - self.p {
            self.b1.pop_lru();
        }
        if self.b2.len() > self.p {
            self.b2.pop_lru();
        }

        self.t1.put(key, value);
    }

    /// Evict one live entry into the matching ghost list.
    fn replace(&mut self, b2_contains_key: bool) {
        let t1_len = self.t1.len();
        if t1_len > 0 && (t1_len > self.p || (t1_len == self.p && b2_contains_key)) {
            if let Some((k, _)) = self.t1.pop_lru() {
                self.b1.put(k, ());
            }
        } else if let Some((k, _)) = self.t2.pop_lru() {
            self.b2.put(k, ());
        }
    }

    fn live_len(&self) -> usize {
        self.t1.len() + self.t2.len()
    }
}
