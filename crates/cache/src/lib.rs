//! Read-through / write-through cache layer.
//!
//! [`CacheClient`] is the contract of an external, best-effort key-value
//! cache with memcache-style check-and-set (`gets` + `cas`). [`CoherentCache`]
//! sits on top of it and is the only way the wiki layer writes to the cache.
//! Any key may be absent at any time; nothing here is authoritative.

pub mod client;
pub mod coherent;
pub mod error;
pub mod memory;

pub use client::{CacheClient, CasToken};
pub use coherent::{CoherentCache, DEFAULT_MAX_CAS_ATTEMPTS};
pub use error::CacheError;
pub use memory::MemoryCache;
