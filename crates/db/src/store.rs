//! Durable-store contracts consumed by the wiki layer.
//!
//! Implementations must make every read and write linearizable within a
//! collection: all users share one consistency scope, all pages another.
//! Nothing is promised across the two.

use async_trait::async_trait;
use versawiki_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::page::Page;
use crate::models::user::{CreateUser, User};
use crate::repositories::{PageRepo, UserRepo};
use crate::DbPool;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken username is [`StoreError::Duplicate`].
    async fn insert(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Confirm the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn find_by_path(&self, path: &str) -> Result<Option<Page>, StoreError>;

    /// Insert a one-version page; a taken path is [`StoreError::Duplicate`].
    async fn insert(&self, path: &str, content: &str, at: Timestamp) -> Result<Page, StoreError>;

    /// Append a version and return the stored history, or `None` if there is
    /// no page at `path`. No check against concurrent appends is made.
    async fn append_version(
        &self,
        path: &str,
        content: &str,
        at: Timestamp,
    ) -> Result<Option<Page>, StoreError>;

    /// Confirm the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// [`UserStore`] backed by the PostgreSQL `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

/// [`PageStore`] backed by the PostgreSQL `pages` table.
#[derive(Clone)]
pub struct PgPageStore {
    pool: DbPool,
}

impl PgPageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageStore for PgPageStore {
    async fn find_by_path(&self, path: &str) -> Result<Option<Page>, StoreError> {
        Ok(PageRepo::find_by_path(&self.pool, path).await?)
    }

    async fn insert(&self, path: &str, content: &str, at: Timestamp) -> Result<Page, StoreError> {
        Ok(PageRepo::create(&self.pool, path, content, at).await?)
    }

    async fn append_version(
        &self,
        path: &str,
        content: &str,
        at: Timestamp,
    ) -> Result<Option<Page>, StoreError> {
        Ok(PageRepo::append_version(&self.pool, path, content, at).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
