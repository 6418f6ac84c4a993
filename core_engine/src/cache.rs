//! Bounded prediction cache keyed by a digest of the request text.
//!
//! Entries expire lazily: a stale entry is only dropped when the same text is
//! looked up again. When the cache is full, the entry with the oldest insertion
//! time is evicted; reads never refresh an entry's position.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::protocol::Prediction;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of retained entries. Zero disables caching.
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

/// SHA-256 digest of the input text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        Self(Sha256::digest(text.as_bytes()).into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

#[derive(Debug)]
struct CacheEntry {
    predictions: Vec<Prediction>,
    inserted_at: Instant,
    seq: u64,
}

/// Insertion-time index: `(inserted_at, seq)` sorts oldest first, `seq`
/// breaking ties in favour of the earlier insert.
type OrderKey = (Instant, u64);

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    order: BTreeMap<OrderKey, Fingerprint>,
    next_seq: u64,
}

impl CacheState {
    fn remove(&mut self, key: &Fingerprint) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&(entry.inserted_at, entry.seq));
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<Fingerprint> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

#[derive(Debug)]
pub struct FingerprintCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl FingerprintCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn get(&self, text: &str) -> Option<Vec<Prediction>> {
        self.get_at(text, Instant::now())
    }

    pub fn put(&self, text: &str, predictions: Vec<Prediction>) {
        self.put_at(text, predictions, Instant::now());
    }

    /// Looks up `text` as of `now`, removing the entry if it has outlived the TTL.
    pub fn get_at(&self, text: &str, now: Instant) -> Option<Vec<Prediction>> {
        let key = Fingerprint::of(text);
        let mut state = self.lock();
        let inserted_at = state.entries.get(&key)?.inserted_at;
        if now.saturating_duration_since(inserted_at) < self.config.ttl {
            return state.entries.get(&key).map(|entry| entry.predictions.clone());
        }
        state.remove(&key);
        None
    }

    /// Stores `predictions` for `text`, inserted at `now`. Capacity check,
    /// eviction and insert happen under one lock.
    pub fn put_at(&self, text: &str, predictions: Vec<Prediction>, now: Instant) {
        if self.config.capacity == 0 {
            return;
        }
        let key = Fingerprint::of(text);
        let mut state = self.lock();
        if state.entries.len() >= self.config.capacity {
            state.evict_oldest();
        }
        state.remove(&key);

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.insert((now, seq), key);
        state.entries.insert(
            key,
            CacheEntry {
                predictions,
                inserted_at: now,
                seq,
            },
        );
        debug_assert!(state.entries.len() <= self.config.capacity);
        debug_assert_eq!(state.entries.len(), state.order.len());
    }

    /// Whether an entry for `text` is retained, regardless of its age.
    pub fn contains(&self, text: &str) -> bool {
        self.lock().entries.contains_key(&Fingerprint::of(text))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn preds(word: &str) -> Vec<Prediction> {
        vec![Prediction::new(word, 1)]
    }

    fn small(capacity: usize, ttl_secs: u64) -> FingerprintCache {
        FingerprintCache::new(CacheConfig {
            capacity,
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    #[test]
    fn fingerprint_is_stable_and_distinct() {
        assert_eq!(Fingerprint::of("I am th"), Fingerprint::of("I am th"));
        assert_ne!(Fingerprint::of("I am th"), Fingerprint::of("I am the"));
        assert_eq!(Fingerprint::of("").to_string().len(), 64);
    }

    #[test]
    fn hit_returns_stored_predictions() {
        let cache = FingerprintCache::default();
        cache.put("hello wor", preds("world"));
        assert_eq!(cache.get("hello wor"), Some(preds("world")));
        assert_eq!(cache.get("hello"), None);
    }

    #[test]
    fn overwrite_replaces_entry() {
        let cache = FingerprintCache::default();
        cache.put("a", preds("x"));
        cache.put("a", preds("y"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(preds("y")));
    }

    #[test]
    fn hundred_and_one_inserts_evict_the_first() {
        let cache = FingerprintCache::default();
        let start = Instant::now();
        for i in 0..101u64 {
            cache.put_at(&format!("text {i}"), preds("w"), start + Duration::from_millis(i));
        }
        assert_eq!(cache.len(), 100);
        assert!(!cache.contains("text 0"));
        assert!(cache.contains("text 1"));
        assert!(cache.contains("text 100"));
    }

    #[test]
    fn oldest_entries_are_the_ones_evicted() {
        let cache = small(3, 300);
        let start = Instant::now();
        for i in 0..6u64 {
            cache.put_at(&i.to_string(), preds("w"), start + Duration::from_secs(i));
        }
        assert_eq!(cache.len(), 3);
        for evicted in ["0", "1", "2"] {
            assert!(!cache.contains(evicted));
        }
        for kept in ["3", "4", "5"] {
            assert!(cache.contains(kept));
        }
    }

    #[test]
    fn reads_do_not_refresh_eviction_order() {
        let cache = small(2, 300);
        let start = Instant::now();
        cache.put_at("first", preds("a"), start);
        cache.put_at("second", preds("b"), start + Duration::from_secs(1));
        assert!(cache.get_at("first", start + Duration::from_secs(2)).is_some());
        cache.put_at("third", preds("c"), start + Duration::from_secs(3));
        assert!(!cache.contains("first"));
        assert!(cache.contains("second"));
    }

    #[test]
    fn equal_timestamps_evict_first_inserted() {
        let cache = small(2, 300);
        let now = Instant::now();
        cache.put_at("a", preds("a"), now);
        cache.put_at("b", preds("b"), now);
        cache.put_at("c", preds("c"), now);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn expired_entry_is_a_miss_and_removed() {
        let cache = FingerprintCache::default();
        let start = Instant::now();
        cache.put_at("stale", preds("w"), start);
        let later = start + DEFAULT_TTL + Duration::from_millis(1);
        assert_eq!(cache.get_at("stale", later), None);
        assert!(!cache.contains("stale"));
        assert!(cache.is_empty());
    }

    #[test]
    fn entry_at_exact_ttl_is_expired() {
        let cache = small(10, 5);
        let start = Instant::now();
        cache.put_at("edge", preds("w"), start);
        assert!(cache.get_at("edge", start + Duration::from_secs(4)).is_some());
        assert!(cache.get_at("edge", start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = small(0, 300);
        cache.put("a", preds("x"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn concurrent_writers_never_exceed_capacity() {
        let cache = Arc::new(small(16, 300));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        cache.put(&format!("{worker}-{i}"), preds("w"));
                        assert!(cache.len() <= 16);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 16);
    }
}
