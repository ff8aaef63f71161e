//! In-process TTL cache shared by the catalog routes.
//!
//! Every successful insert schedules its own deletion `ttl` later. A
//! deletion only fires if the entry it was scheduled for is still the one
//! in the map, so a refreshed entry is never evicted by an older timer.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

struct Slot<V> {
    value: Arc<V>,
    generation: u64,
}

/// Key/value cache with per-entry expiry.
///
/// Cloning is cheap and clones share the same entries.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, Slot<V>>>>,
    generation: Arc<AtomicU64>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// `name` only appears in log lines.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|slot| Arc::clone(&slot.value))
    }

    /// Stores `value` under `key` with the cache's default TTL.
    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        self.insert_with_ttl(key, value, self.ttl).await
    }

    /// Stores `value` under `key`, replacing any previous entry, and
    /// schedules its removal after `ttl`.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut entries = self.entries.write().await;
            entries.insert(
                key.clone(),
                Slot {
                    value: Arc::clone(&value),
                    generation,
                },
            );
        }

        let entries = Arc::clone(&self.entries);
        let name = self.name;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut entries = entries.write().await;
            if entries
                .get(&key)
                .is_some_and(|slot| slot.generation == generation)
            {
                entries.remove(&key);
                tracing::debug!(cache = name, ?key, "cache entry expired");
            }
        });

        value
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its
    /// result on success. Errors are returned as-is and never cached.
    ///
    /// Concurrent misses for the same key each run `fetch`; the last
    /// result to land wins.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key).await {
            tracing::debug!(cache = self.name, ?key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(cache = self.name, ?key, "cache miss");
        let value = fetch().await?;
        Ok(self.insert(key, value).await)
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    const TTL: Duration = Duration::from_secs(120);

    fn cache() -> TtlCache<&'static str, u32> {
        TtlCache::new("test", TTL)
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_runs_once_within_ttl() {
        let cache = cache();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("terea", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(7)
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_cached() {
        let cache = cache();

        let err = cache
            .get_or_fetch("terea", || async { Err::<u32, _>("upstream down") })
            .await
            .unwrap_err();
        assert_eq!(err, "upstream down");
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_fetch("terea", || async { Ok::<_, &str>(3) })
            .await
            .unwrap();
        assert_eq!(*value, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = cache();
        cache.insert("iqos", 1).await;

        tokio::time::sleep(TTL - Duration::from_secs(1)).await;
        assert!(cache.get(&"iqos").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.get(&"iqos").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_evict_refreshed_entry() {
        let cache = cache();
        cache.insert("devices", 1).await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        cache.insert("devices", 2).await;

        // First timer fires at 120s; the refreshed entry lives until 180s.
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(cache.get(&"devices").await.as_deref(), Some(&2));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(cache.get(&"devices").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn per_entry_ttl_overrides_default() {
        let cache = cache();
        cache
            .insert_with_ttl("short", 1, Duration::from_secs(5))
            .await;
        cache.insert("long", 2).await;

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(cache.get(&"short").await.is_none());
        assert!(cache.get(&"long").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_and_clear() {
        let cache = cache();
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        assert_eq!(cache.len().await, 2);

        cache.invalidate(&"a").await;
        assert!(cache.get(&"a").await.is_none());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
