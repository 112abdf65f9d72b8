use versawiki_cache::CacheError;
use versawiki_core::error::CoreError;
use versawiki_db::StoreError;

/// Error from a wiki operation.
///
/// Domain outcomes arrive as [`CoreError`]; failures of the durable store or
/// the cache are passed through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type WikiResult<T> = Result<T, WikiError>;
