#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache service could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for storage.
    #[error("Cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Every check-and-set attempt lost to a concurrent writer.
    #[error("Cache key '{key}' still contended after {attempts} attempts")]
    Contention { key: String, attempts: usize },
}
