#![allow(dead_code)]

use std::sync::Arc;

use versawiki_cache::{CoherentCache, MemoryCache};
use versawiki_core::integrity::IntegrityCodec;
use versawiki_db::memory::{MemoryPageStore, MemoryUserStore};
use versawiki_wiki::WikiContext;

pub const TEST_SECRET: &str = "test session secret";

/// A context plus handles on its backing stores and cache, so tests can
/// inspect them or knock them offline.
pub struct Harness {
    pub users: Arc<MemoryUserStore>,
    pub pages: Arc<MemoryPageStore>,
    pub cache: Arc<MemoryCache>,
    pub wiki: WikiContext,
}

pub fn harness() -> Harness {
    let users = Arc::new(MemoryUserStore::new());
    let pages = Arc::new(MemoryPageStore::new());
    let cache = Arc::new(MemoryCache::new());
    let wiki = WikiContext::new(
        users.clone(),
        pages.clone(),
        CoherentCache::new(cache.clone()),
        IntegrityCodec::new(TEST_SECRET),
    );
    Harness {
        users,
        pages,
        cache,
        wiki,
    }
}
