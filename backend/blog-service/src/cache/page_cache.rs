use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::Result;
use crate::metrics::feed::{PAGE_CACHE_ENTRIES, PAGE_CACHE_EVENTS};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded TTL cache for rendered feed pages.
///
/// Entries are served unchanged until they expire or are invalidated; writes
/// to the underlying data never touch the cache. When full, expired entries
/// are dropped first, then the oldest one.
#[derive(Clone)]
pub struct PageCache<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> PageCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Key of one page of the global feed
    pub fn global_index_key(page: usize) -> String {
        format!("global-index:page={}", page)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                PAGE_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                debug!(key, "Page cache HIT");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            PAGE_CACHE_EVENTS.with_label_values(&["expired"]).inc();
            PAGE_CACHE_ENTRIES.set(self.entries.len() as i64);
        }
        PAGE_CACHE_EVENTS.with_label_values(&["miss"]).inc();
        debug!(key, "Page cache MISS");
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        PAGE_CACHE_ENTRIES.set(self.entries.len() as i64);
    }

    /// Return the cached value or compute, store and return a fresh one.
    ///
    /// Errors from `compute` are returned as-is and nothing is cached.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            PAGE_CACHE_EVENTS.with_label_values(&["invalidate"]).inc();
            PAGE_CACHE_ENTRIES.set(self.entries.len() as i64);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        PAGE_CACHE_ENTRIES.set(0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            PAGE_CACHE_EVENTS.with_label_values(&["evict"]).inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = PageCache::new(Duration::from_secs(20), 8);
        cache.insert("global-index:page=1", "v1".to_string());

        tokio::time::advance(Duration::from_secs(19)).await;
        assert_eq!(cache.get("global-index:page=1").as_deref(), Some("v1"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("global-index:page=1"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_or_compute_serves_stale_value_until_expiry() {
        let cache = PageCache::new(Duration::from_secs(20), 8);
        let calls = AtomicUsize::new(0);

        let compute = |label: &'static str| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, AppError>(label.to_string()) }
        };

        let first = cache.get_or_compute("k", || compute("first")).await.unwrap();
        let second = cache.get_or_compute("k", || compute("second")).await.unwrap();
        assert_eq!(first, "first");
        assert_eq!(second, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(21)).await;
        let third = cache.get_or_compute("k", || compute("third")).await.unwrap();
        assert_eq!(third, "third");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_compute_error_is_not_cached() {
        let cache: PageCache<String> = PageCache::new(Duration::from_secs(20), 8);
        let result = cache
            .get_or_compute("k", || async { Err(AppError::Internal("db down".into())) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_evicts_oldest() {
        let cache = PageCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("b", 2);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = PageCache::new(Duration::from_secs(60), 4);
        cache.insert(PageCache::<u8>::global_index_key(1), 1u8);
        cache.insert(PageCache::<u8>::global_index_key(2), 2u8);

        assert!(cache.invalidate("global-index:page=1"));
        assert!(!cache.invalidate("global-index:page=1"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
