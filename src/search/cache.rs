//! Single-cycle result cache
//!
//! Entries are valid only for the game time they were stored under. Any
//! access with a different time drops every entry first.

use std::hash::Hash;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::model::time::GameTime;

#[derive(Debug)]
pub struct CycleCache<K, V> {
    time: Option<GameTime>,
    entries: HashMap<K, V, FxBuildHasher>,
}

impl<K, V> CycleCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            time: None,
            entries: HashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Bind the cache to `time`; returns true when stale entries were dropped
    pub fn begin_cycle(&mut self, time: GameTime) -> bool {
        if self.time == Some(time) {
            return false;
        }
        let dropped = !self.entries.is_empty();
        self.entries.clear();
        self.time = Some(time);
        dropped
    }

    pub fn get(&mut self, time: GameTime, key: &K) -> Option<V> {
        self.begin_cycle(time);
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, time: GameTime, key: K, value: V) {
        self.begin_cycle(time);
        self.entries.insert(key, value);
    }

    /// Cached value for `key`, computing and storing it on a miss
    pub fn get_or_insert_with(&mut self, time: GameTime, key: K, f: impl FnOnce() -> V) -> V {
        self.begin_cycle(time);
        self.entries.entry(key).or_insert_with(f).clone()
    }

    pub fn current_time(&self) -> Option<GameTime> {
        self.time
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.time = None;
    }
}

impl<K, V> Default for CycleCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_cycle() {
        let mut cache: CycleCache<u32, &str> = CycleCache::new();
        let t = GameTime::new(10, 0);
        cache.insert(t, 1, "a");
        assert_eq!(cache.get(t, &1), Some("a"));
        assert_eq!(cache.get(t, &2), None);
    }

    #[test]
    fn test_time_change_invalidates() {
        let mut cache: CycleCache<u32, u32> = CycleCache::new();
        cache.insert(GameTime::new(10, 0), 1, 100);
        assert_eq!(cache.get(GameTime::new(11, 0), &1), None);
        assert!(cache.is_empty());
        assert_eq!(cache.current_time(), Some(GameTime::new(11, 0)));

        // Stopped-time cycles count as a different time too
        cache.insert(GameTime::new(11, 0), 1, 100);
        assert_eq!(cache.get(GameTime::new(11, 1), &1), None);
    }

    #[test]
    fn test_get_or_insert_computes_once() {
        let mut cache: CycleCache<u32, u32> = CycleCache::new();
        let t = GameTime::new(3, 0);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache.get_or_insert_with(t, 7, || {
                calls += 1;
                42
            });
            assert_eq!(v, 42);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_begin_cycle_reports_drop() {
        let mut cache: CycleCache<u32, u32> = CycleCache::new();
        assert!(!cache.begin_cycle(GameTime::new(1, 0)));
        cache.insert(GameTime::new(1, 0), 1, 1);
        assert!(!cache.begin_cycle(GameTime::new(1, 0)));
        assert!(cache.begin_cycle(GameTime::new(2, 0)));
    }
}
