//! Typed read-through / write-through access on top of a [`CacheClient`].

use std::future::Future;
use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::client::CacheClient;
use crate::error::CacheError;

/// Default bound on check-and-set attempts per [`CoherentCache::put`].
pub const DEFAULT_MAX_CAS_ATTEMPTS: usize = 32;

/// JSON-encoded values over a shared [`CacheClient`].
#[derive(Clone)]
pub struct CoherentCache {
    client: Arc<dyn CacheClient>,
    max_cas_attempts: usize,
}

impl CoherentCache {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            client,
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }

    /// Override the CAS retry bound (at least one attempt is always made).
    pub fn with_max_cas_attempts(mut self, attempts: usize) -> Self {
        self.max_cas_attempts = attempts.max(1);
        self
    }

    pub fn client(&self) -> &Arc<dyn CacheClient> {
        &self.client
    }

    /// Read and decode a cached value.
    ///
    /// An entry that no longer decodes (e.g. written by an older build) is a
    /// miss, not an error. It is deleted so the next fill can replace it.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.client.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "Undecodable cache entry, dropping it");
                self.client.delete(key).await?;
                Ok(None)
            }
        }
    }

    /// Return the cached value, or run `loader` on a miss and cache what it
    /// produces.
    ///
    /// Population uses `add`, so a value that a concurrent writer stored
    /// while the loader ran is kept rather than overwritten with what may be
    /// an older read.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await? {
            tracing::trace!(key, "Cache hit");
            return Ok(Some(hit));
        }

        tracing::trace!(key, "Cache miss");
        let loaded = loader().await?;
        if let Some(value) = &loaded {
            self.fill(key, value).await?;
        }
        Ok(loaded)
    }

    /// Store `value` only if `key` is absent.
    pub async fn fill<T: Serialize>(&self, key: &str, value: &T) -> Result<bool, CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.client.add(key, bytes).await
    }

    /// Replace the entry for `key` with `value` using check-and-set.
    ///
    /// Each attempt reads the current entry's CAS token and swaps against it;
    /// a concurrent write in between makes the swap fail and the cycle
    /// restarts. A missing entry is initialized with `add`, and losing that
    /// race also restarts the cycle. Fails with [`CacheError::Contention`]
    /// once the attempt bound is exhausted.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put_unless(key, value, |_: &IgnoredAny| false)
            .await
            .map(|_| ())
    }

    /// Like [`put`](Self::put), but leaves the entry alone when `keep`
    /// returns true for the value currently cached.
    ///
    /// The check runs inside the CAS cycle, so the value it saw is the one
    /// the swap would have replaced. Returns whether `value` was written.
    pub async fn put_unless<T, C, F>(&self, key: &str, value: &T, keep: F) -> Result<bool, CacheError>
    where
        T: Serialize,
        C: DeserializeOwned,
        F: Fn(&C) -> bool,
    {
        let bytes = serde_json::to_vec(value)?;

        for attempt in 1..=self.max_cas_attempts {
            match self.client.gets(key).await? {
                Some((current, token)) => {
                    if serde_json::from_slice::<C>(&current).is_ok_and(|c| keep(&c)) {
                        tracing::debug!(key, "Cached entry kept over write");
                        return Ok(false);
                    }
                    if self.client.cas(key, bytes.clone(), token).await? {
                        return Ok(true);
                    }
                    tracing::debug!(key, attempt, "CAS conflict, retrying");
                }
                None => {
                    if self.client.add(key, bytes.clone()).await? {
                        tracing::debug!(key, "Initialized cache key");
                        return Ok(true);
                    }
                    tracing::debug!(key, attempt, "Lost cache key initialization race, retrying");
                }
            }
        }

        Err(CacheError::Contention {
            key: key.to_string(),
            attempts: self.max_cas_attempts,
        })
    }

    /// Remove `key` from the cache.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.client.delete(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::memory::MemoryCache;

    fn cache() -> (Arc<MemoryCache>, CoherentCache) {
        let client = Arc::new(MemoryCache::new());
        (client.clone(), CoherentCache::new(client))
    }

    #[tokio::test]
    async fn put_initializes_then_replaces() {
        let (_, cache) = cache();
        cache.put("k", &"v1".to_string()).await.unwrap();
        assert_eq!(cache.get::<String>("k").await.unwrap().as_deref(), Some("v1"));
        cache.put("k", &"v2".to_string()).await.unwrap();
        assert_eq!(cache.get::<String>("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn get_or_load_runs_loader_once() {
        let (_, cache) = cache();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let loader = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(Some(7u32))
        };

        assert_eq!(cache.get_or_load("n", loader).await.unwrap(), Some(7));
        assert_eq!(cache.get_or_load("n", loader).await.unwrap(), Some(7));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_or_load_caches_nothing_on_loader_miss() {
        let (client, cache) = cache();
        let loaded: Option<u32> = cache
            .get_or_load("n", || async { Ok::<_, CacheError>(None) })
            .await
            .unwrap();
        assert_eq!(loaded, None);
        assert!(client.is_empty().await);
    }

    #[tokio::test]
    async fn loader_error_propagates() {
        let (_, cache) = cache();
        let result: Result<Option<u32>, CacheError> = cache
            .get_or_load("n", || async { Err(CacheError::Unavailable("db down".into())) })
            .await;
        assert_matches!(result, Err(CacheError::Unavailable(_)));
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let (client, cache) = cache();
        client.add("k", b"not json".to_vec()).await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn undecodable_entry_is_replaced_on_next_load() {
        let (client, cache) = cache();
        client.add("page:/home", b"not json".to_vec()).await.unwrap();

        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let loader = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(Some(7u32))
        };

        for _ in 0..3 {
            assert_eq!(cache.get_or_load("page:/home", loader).await.unwrap(), Some(7));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(client.get("page:/home").await.unwrap(), Some(b"7".to_vec()));
    }

    #[tokio::test]
    async fn put_unless_keeps_entry_the_predicate_prefers() {
        let (_, cache) = cache();
        cache.put("n", &5u32).await.unwrap();

        let newer = |current: &u32| *current > 3;
        assert!(!cache.put_unless("n", &3u32, newer).await.unwrap());
        assert_eq!(cache.get::<u32>("n").await.unwrap(), Some(5));

        let newer = |current: &u32| *current > 9;
        assert!(cache.put_unless("n", &9u32, newer).await.unwrap());
        assert_eq!(cache.get::<u32>("n").await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn put_unless_initializes_missing_key() {
        let (_, cache) = cache();
        assert!(cache.put_unless("n", &1u32, |_: &u32| true).await.unwrap());
        assert_eq!(cache.get::<u32>("n").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn eviction_between_reads_is_tolerated() {
        let (client, cache) = cache();
        cache.put("k", &1u32).await.unwrap();
        client.flush_all().await;
        let reloaded: Option<u32> = cache
            .get_or_load("k", || async { Ok::<_, CacheError>(Some(2)) })
            .await
            .unwrap();
        assert_eq!(reloaded, Some(2));
    }

    #[tokio::test]
    async fn unreachable_cache_surfaces() {
        let (client, cache) = cache();
        client.set_offline(true);
        assert_matches!(cache.put("k", &1u32).await, Err(CacheError::Unavailable(_)));
    }
}
