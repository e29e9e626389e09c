//! Least-recently-used cache for expensive collaborator results
//!
//! Recognition of the same media with the same model always yields the same
//! transcript, so re-syncing after a lyrics change does not need a second
//! multi-minute recognizer run.

use super::{CancellationToken, RecognitionRequest, Recognizer, Transcript};
use crate::error::Result;
use ahash::AHashMap;
use core::hash::Hash;
use parking_lot::Mutex;
use tracing::{debug, trace};

struct CacheEntry<V> {
    value: V,
    last_used: u64,
}

struct CacheState<K, V> {
    entries: AHashMap<K, CacheEntry<V>>,
    clock: u64,
    hits: u64,
    misses: u64,
}

/// Counters describing cache usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Entries currently stored
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

/// Thread-safe LRU cache with a fixed entry limit
///
/// A capacity of 0 disables caching: inserts are dropped and lookups miss.
pub struct ResourceCache<K, V> {
    capacity: usize,
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> core::fmt::Debug for ResourceCache<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourceCache")
            .field("capacity", &self.capacity)
            .field("entries", &state.entries.len())
            .finish()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ResourceCache<K, V> {
    /// Cache holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState {
                entries: AHashMap::with_capacity(capacity),
                clock: 0,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached value for `key`, marking it recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock();
        state.clock += 1;
        let now = state.clock;
        let found = state.entries.get_mut(key).map(|entry| {
            entry.last_used = now;
            entry.value.clone()
        });
        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        found
    }

    /// Store `value`, evicting the least recently used entry when full
    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.state.lock();
        state.clock += 1;
        let now = state.clock;

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                state.entries.remove(&oldest);
                trace!("evicted least recently used entry");
            }
        }

        state.entries.insert(
            key,
            CacheEntry {
                value,
                last_used: now,
            },
        );
    }

    /// Cached value for `key`, or the result of `load` stored for next time
    ///
    /// The lock is not held while `load` runs, so two callers missing the
    /// same key may both load it. Errors are returned and never cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` fails with.
    pub fn get_or_try_insert_with<F>(&self, key: &K, load: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = load()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Drop the entry for `key`
    pub fn remove(&self, key: &K) -> Option<V> {
        self.state.lock().entries.remove(key).map(|entry| entry.value)
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Usage counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }
}

/// Recognizer that remembers transcripts per request
#[derive(Debug)]
pub struct CachedRecognizer<R> {
    inner: R,
    cache: ResourceCache<RecognitionRequest, Transcript>,
}

impl<R: Recognizer> CachedRecognizer<R> {
    /// Wrap `inner`, keeping up to `capacity` transcripts
    #[must_use]
    pub fn new(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            cache: ResourceCache::new(capacity),
        }
    }

    /// Underlying cache
    #[must_use]
    pub fn cache(&self) -> &ResourceCache<RecognitionRequest, Transcript> {
        &self.cache
    }
}

impl<R: Recognizer> Recognizer for CachedRecognizer<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn recognize(&self, request: &RecognitionRequest, cancel: &CancellationToken) -> Result<Transcript> {
        self.cache.get_or_try_insert_with(request, || {
            debug!(media = %request.media.display(), model = %request.model, "transcript not cached");
            self.inner.recognize(request, cancel)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KaraokeError;
    use crate::timeline::RawCue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResourceCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn replacing_a_key_does_not_evict() {
        let cache = ResourceCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = ResourceCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: ResourceCache<&str, i32> = ResourceCache::new(4);
        let failed = cache.get_or_try_insert_with(&"k", || Err(KaraokeError::io("nope")));
        assert!(failed.is_err());
        assert_eq!(cache.get_or_try_insert_with(&"k", || Ok(5)).unwrap(), 5);
        assert_eq!(cache.get_or_try_insert_with(&"k", || Ok(6)).unwrap(), 5);
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    struct CountingRecognizer {
        calls: AtomicUsize,
    }

    impl Recognizer for CountingRecognizer {
        fn name(&self) -> &str {
            "counting"
        }

        fn recognize(&self, _request: &RecognitionRequest, _cancel: &CancellationToken) -> Result<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Transcript::new(vec![RawCue::new("hola", 0.0, 0.5)]))
        }
    }

    #[test]
    fn cached_recognizer_runs_once_per_request() {
        let recognizer = CachedRecognizer::new(
            CountingRecognizer {
                calls: AtomicUsize::new(0),
            },
            4,
        );
        let token = CancellationToken::new();
        let request = RecognitionRequest::new("song.mp3", "small");

        let first = recognizer.recognize(&request, &token).unwrap();
        let second = recognizer.recognize(&request, &token).unwrap();
        assert_eq!(first, second);
        assert_eq!(recognizer.inner.calls.load(Ordering::SeqCst), 1);

        let other = RecognitionRequest::new("song.mp3", "base");
        recognizer.recognize(&other, &token).unwrap();
        assert_eq!(recognizer.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(recognizer.name(), "counting");
    }
}
