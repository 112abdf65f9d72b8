//! In-process stores for development and tests.
//!
//! Each collection sits behind a single lock, which makes it trivially
//! linearizable. Both stores can be switched offline to exercise the
//! "durable store unreachable" path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use versawiki_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::page::Page;
use crate::models::user::{CreateUser, User};
use crate::store::{PageStore, UserStore};

#[derive(Default)]
struct UserTable {
    next_id: DbId,
    by_id: HashMap<DbId, User>,
    id_by_username: HashMap<String, DbId>,
}

/// [`UserStore`] kept in memory. Ids start at 1.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
    offline: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory user store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, input: &CreateUser) -> Result<User, StoreError> {
        self.check_online()?;
        let mut table = self.table.write().await;
        if table.id_by_username.contains_key(&input.username) {
            return Err(StoreError::Duplicate("uq_users_username".into()));
        }
        table.next_id += 1;
        let user = User {
            id: table.next_id,
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            email: input.email.clone(),
            created_at: Utc::now(),
        };
        table.id_by_username.insert(user.username.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        Ok(self.table.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let table = self.table.read().await;
        Ok(table
            .id_by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

/// [`PageStore`] kept in memory, keyed by path.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: RwLock<HashMap<String, Page>>,
    offline: AtomicBool,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory page store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn find_by_path(&self, path: &str) -> Result<Option<Page>, StoreError> {
        self.check_online()?;
        Ok(self.pages.read().await.get(path).cloned())
    }

    async fn insert(&self, path: &str, content: &str, at: Timestamp) -> Result<Page, StoreError> {
        self.check_online()?;
        let mut pages = self.pages.write().await;
        if pages.contains_key(path) {
            return Err(StoreError::Duplicate("pk_pages".into()));
        }
        let page = Page::new(path, content, at);
        pages.insert(path.to_string(), page.clone());
        Ok(page)
    }

    async fn append_version(
        &self,
        path: &str,
        content: &str,
        at: Timestamp,
    ) -> Result<Option<Page>, StoreError> {
        self.check_online()?;
        let mut pages = self.pages.write().await;
        Ok(pages.get_mut(path).map(|page| {
            page.push_version(content, at);
            page.clone()
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
