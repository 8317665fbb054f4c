// src/fetch/cache.rs

use std::{
    cell::Cell,
    collections::HashMap,
    rc::Rc,
    time::{Duration, Instant},
};

/// Source of "now" for cache expiry.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Key → value cache where entries expire `ttl` after insertion.
pub struct TtlCache<V, C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> TtlCache<V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V: Clone, C: Clock> TtlCache<V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, evicting it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(e) if now.duration_since(e.stored_at) < self.ttl => Some(e.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key.into(), Entry { value, stored_at });
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_lives_until_ttl() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(300), clock.clone());
        cache.insert("url", 1u32);

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get("url"), Some(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("url"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_are_independent() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(10), clock.clone());
        cache.insert("a", "first".to_string());
        clock.advance(Duration::from_secs(6));
        cache.insert("b", "second".to_string());
        clock.advance(Duration::from_secs(6));

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("second"));
        cache.invalidate("b");
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn zero_ttl_never_hits() {
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert("k", 3i64);
        assert_eq!(cache.get("k"), None);
    }
}
