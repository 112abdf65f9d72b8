use std::sync::Arc;

use versawiki_cache::{CacheClient, CoherentCache, MemoryCache};
use versawiki_core::integrity::IntegrityCodec;
use versawiki_core::types::DbId;
use versawiki_db::memory::{MemoryPageStore, MemoryUserStore};
use versawiki_db::models::user::User;
use versawiki_db::store::{PageStore, UserStore};

use crate::credentials::CredentialStore;
use crate::error::WikiResult;
use crate::pages::PageVersionStore;

/// Everything a request needs: both stores (sharing one cache) and the
/// session codec. Cheap to clone.
#[derive(Clone)]
pub struct WikiContext {
    pub credentials: CredentialStore,
    pub pages: PageVersionStore,
    pub codec: IntegrityCodec,
}

impl WikiContext {
    pub fn new(
        users: Arc<dyn UserStore>,
        pages: Arc<dyn PageStore>,
        cache: CoherentCache,
        codec: IntegrityCodec,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(users, cache.clone()),
            pages: PageVersionStore::new(pages, cache),
            codec,
        }
    }

    /// A context over fresh in-memory stores and cache.
    pub fn in_memory(secret: &str) -> Self {
        let cache: Arc<dyn CacheClient> = Arc::new(MemoryCache::new());
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryPageStore::new()),
            CoherentCache::new(cache),
            IntegrityCodec::new(secret),
        )
    }

    /// Signed session token identifying `user`.
    pub fn session_token(&self, user: &User) -> String {
        self.codec.sign(&user.id.to_string())
    }

    /// Resolve a session token to its user.
    ///
    /// A forged or malformed token, or one naming a user that no longer
    /// resolves, is `Ok(None)`: the caller is simply not logged in. Only
    /// store or cache failures are errors.
    pub async fn session_user(&self, token: &str) -> WikiResult<Option<User>> {
        let Some(user_id) = self.codec.verify(token) else {
            return Ok(None);
        };
        let Ok(id) = user_id.parse::<DbId>() else {
            return Ok(None);
        };
        self.credentials.find_by_id(id).await
    }

    /// Check that both durable stores are reachable.
    pub async fn ping(&self) -> WikiResult<()> {
        self.credentials.ping().await?;
        self.pages.ping().await
    }
}
