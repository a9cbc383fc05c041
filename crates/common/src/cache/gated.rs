//! Reader/writer gated cache implementation

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::stats::{CacheStats, MetricsCollector};

/// Lazily populated cache of values derived from a shared state `S`
///
/// - Hits are served straight from the map without touching the gate.
/// - Misses derive the value while holding the shared side of the gate, so
///   any number of misses (for different or equal keys) run in parallel.
///   Racing misses for the same key are not deduplicated; the last insert
///   wins.
/// - [`recompute`](Self::recompute) holds the exclusive side for the whole
///   recalculation and clears the map before releasing it, on every exit
///   path.
///
/// Clones share the same gate, map and counters.
pub struct GatedCache<K, V, S>
where
    K: Eq + Hash,
{
    gate: Arc<RwLock<S>>,
    entries: Arc<DashMap<K, V>>,
    metrics: MetricsCollector,
}

impl<K, V, S> GatedCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: Clone,
{
    /// Create an empty cache guarding the given initial state
    pub fn new(state: S) -> Self {
        Self {
            gate: Arc::new(RwLock::new(state)),
            entries: Arc::new(DashMap::new()),
            metrics: MetricsCollector::default(),
        }
    }

    /// Return the cached value for `key` without deriving it
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Return the cached value for `key`, deriving and storing it on a miss
    ///
    /// `derive` receives a snapshot of the guarded state and runs while the
    /// shared side of the gate is held; the result is inserted before the
    /// gate is released, so a recalculation can never interleave between
    /// deriving and storing.
    ///
    /// # Errors
    ///
    /// Returns whatever `derive` fails with; nothing is cached in that case.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, derive: F) -> Result<V, E>
    where
        F: FnOnce(S) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cached = self.peek(&key);
        if let Some(value) = cached {
            self.metrics.record_hit();
            return Ok(value);
        }
        self.metrics.record_miss();

        let state = self.gate.read().await;
        trace!("Deriving value under shared gate");
        let value = derive(state.clone()).await?;
        self.entries.insert(key, value.clone());
        self.metrics.record_insert();
        drop(state);

        Ok(value)
    }

    /// Replace the guarded state and invalidate every cached value
    ///
    /// `recalculate` receives the current state and returns the next one. It
    /// runs under the exclusive side of the gate: no value is derived until
    /// it finishes. The map is cleared when this call exits, whether it
    /// succeeded, failed, or its future was dropped midway. On failure the
    /// previous state is kept.
    ///
    /// # Errors
    ///
    /// Returns whatever `recalculate` fails with.
    pub async fn recompute<F, Fut, E>(&self, recalculate: F) -> Result<(), E>
    where
        F: FnOnce(S) -> Fut,
        Fut: Future<Output = Result<S, E>>,
    {
        let mut state = self.gate.write().await;
        // Declared after the guard so it runs first, while the gate is still held
        let _invalidate = InvalidateOnExit { entries: &self.entries, metrics: &self.metrics };

        let next = recalculate(state.clone()).await?;
        *state = next;
        Ok(())
    }

    /// Snapshot of the guarded state
    ///
    /// Waits for an in-progress recalculation to finish.
    pub async fn state(&self) -> S {
        self.gate.read().await.clone()
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }
}

impl<K, V, S> Clone for GatedCache<K, V, S>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            entries: Arc::clone(&self.entries),
            metrics: self.metrics.clone(),
        }
    }
}

/// Clears the map when the exclusive phase ends
struct InvalidateOnExit<'a, K, V>
where
    K: Eq + Hash,
{
    entries: &'a DashMap<K, V>,
    metrics: &'a MetricsCollector,
}

impl<K, V> Drop for InvalidateOnExit<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let cleared = self.entries.len();
        self.entries.clear();
        self.metrics.record_invalidation();
        debug!(cleared, "Cached values invalidated");
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::gated.
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    type TestCache = GatedCache<u32, Arc<Vec<u32>>, u32>;

    async fn derive_counted(cache: &TestCache, key: u32, calls: &AtomicUsize) -> Arc<Vec<u32>> {
        cache
            .get_or_compute(key, |generation| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Arc::new(vec![key, generation]))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_miss_populates_single_entry() {
        let cache = TestCache::new(7);
        let calls = AtomicUsize::new(0);

        let value = derive_counted(&cache, 1, &calls).await;

        assert_eq!(*value, vec![1, 7]);
        assert_eq!(cache.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_returns_same_value_without_deriving() {
        let cache = TestCache::new(0);
        let calls = AtomicUsize::new(0);

        let first = derive_counted(&cache, 5, &calls).await;
        let second = derive_counted(&cache, 5, &calls).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_failed_derivation_is_not_cached() {
        let cache = TestCache::new(0);

        let result = cache.get_or_compute(1, |_| async { Err::<Arc<Vec<u32>>, _>("lookup failed") }).await;

        assert_eq!(result.unwrap_err(), "lookup failed");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_recompute_clears_and_advances_state() {
        let cache = TestCache::new(1);
        let calls = AtomicUsize::new(0);
        for key in 0..4 {
            derive_counted(&cache, key, &calls).await;
        }
        assert_eq!(cache.len(), 4);

        cache.recompute(|generation| async move { Ok::<_, String>(generation + 1) }).await.unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.state().await, 2);
        assert_eq!(cache.stats().invalidations, 1);

        let fresh = derive_counted(&cache, 0, &calls).await;
        assert_eq!(*fresh, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_failed_recompute_still_clears_and_keeps_state() {
        let cache = TestCache::new(3);
        let calls = AtomicUsize::new(0);
        derive_counted(&cache, 9, &calls).await;

        let result = cache.recompute(|_| async { Err::<u32, _>("model unavailable") }).await;

        assert_eq!(result.unwrap_err(), "model unavailable");
        assert!(cache.is_empty());
        assert_eq!(cache.state().await, 3);
    }

    #[tokio::test]
    async fn test_dropped_recompute_still_clears() {
        let cache = TestCache::new(0);
        let calls = AtomicUsize::new(0);
        derive_counted(&cache, 1, &calls).await;

        let slow = cache.recompute(|generation| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(generation + 1)
        });
        let outcome = tokio::time::timeout(Duration::from_millis(20), slow).await;

        assert!(outcome.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.state().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_miss_waits_for_exclusive_phase() {
        let cache = TestCache::new(0);
        let recalculated = Arc::new(AtomicBool::new(false));

        let writer = {
            let cache = cache.clone();
            let recalculated = Arc::clone(&recalculated);
            tokio::spawn(async move {
                cache
                    .recompute(|generation| async move {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        recalculated.store(true, Ordering::SeqCst);
                        Ok::<_, String>(generation + 1)
                    })
                    .await
            })
        };

        // Let the writer take the gate first
        tokio::time::sleep(Duration::from_millis(30)).await;

        let seen_during_derive = cache
            .get_or_compute(1, |generation| {
                let finished = recalculated.load(Ordering::SeqCst);
                async move { Ok::<_, String>(Arc::new(vec![u32::from(finished), generation])) }
            })
            .await
            .unwrap();

        assert_eq!(*seen_during_derive, vec![1, 1]);
        writer.await.unwrap().unwrap();
        assert_eq!(cache.len(), 1);
    }
}
