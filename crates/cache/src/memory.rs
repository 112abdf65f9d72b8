//! In-process [`CacheClient`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::{CacheClient, CasToken};
use crate::error::CacheError;

struct Entry {
    value: Vec<u8>,
    cas: u64,
}

/// A cache held in a single map. Every write stamps the entry with a fresh,
/// process-unique CAS value.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    next_cas: AtomicU64,
    offline: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, as a cache restart would.
    pub async fn flush_all(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Make every subsequent call fail with [`CacheError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), CacheError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("memory cache is offline".into()));
        }
        Ok(())
    }

    fn stamp(&self) -> u64 {
        self.next_cas.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check_online()?;
        Ok(self.entries.read().await.get(key).map(|e| e.value.clone()))
    }

    async fn gets(&self, key: &str) -> Result<Option<(Vec<u8>, CasToken)>, CacheError> {
        self.check_online()?;
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|e| (e.value.clone(), CasToken(e.cas))))
    }

    async fn cas(&self, key: &str, value: Vec<u8>, token: CasToken) -> Result<bool, CacheError> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.cas == token.0 => {
                entry.value = value;
                entry.cas = self.stamp();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        let cas = self.stamp();
        entries.insert(key.to_string(), Entry { value, cas });
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.check_online()?;
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn add_only_when_absent() {
        let cache = MemoryCache::new();
        assert!(cache.add("k", b"1".to_vec()).await.unwrap());
        assert!(!cache.add("k", b"2".to_vec()).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn cas_requires_current_token() {
        let cache = MemoryCache::new();
        cache.add("k", b"1".to_vec()).await.unwrap();
        let (_, token) = cache.gets("k").await.unwrap().unwrap();

        assert!(cache.cas("k", b"2".to_vec(), token).await.unwrap());
        // The token is spent: the entry now carries a new stamp.
        assert!(!cache.cas("k", b"3".to_vec(), token).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn cas_on_missing_key_fails() {
        let cache = MemoryCache::new();
        assert!(!cache.cas("k", b"1".to_vec(), CasToken(1)).await.unwrap());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn delete_and_flush() {
        let cache = MemoryCache::new();
        cache.add("a", b"1".to_vec()).await.unwrap();
        cache.add("b", b"2".to_vec()).await.unwrap();
        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());
        assert_eq!(cache.len().await, 1);
        cache.flush_all().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn offline_cache_errors() {
        let cache = MemoryCache::new();
        cache.set_offline(true);
        assert_matches!(cache.get("k").await, Err(CacheError::Unavailable(_)));
    }
}
