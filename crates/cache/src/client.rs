use async_trait::async_trait;

use crate::error::CacheError;

/// Opaque version stamp returned by [`CacheClient::gets`].
///
/// A `cas` succeeds only if the entry still carries the same stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CasToken(pub u64);

/// A shared, concurrency-safe key-value cache.
///
/// Values are opaque bytes and are stored and replaced whole, so a reader
/// never sees a partially written entry.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Read a value together with its current [`CasToken`].
    async fn gets(&self, key: &str) -> Result<Option<(Vec<u8>, CasToken)>, CacheError>;

    /// Replace the value only if the entry exists and still has `token`.
    async fn cas(&self, key: &str, value: Vec<u8>, token: CasToken) -> Result<bool, CacheError>;

    /// Store the value only if the key is absent.
    async fn add(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError>;

    /// Remove the key. Returns whether it was present.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}
