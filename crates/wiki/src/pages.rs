//! Page creation, version appends and point-in-time reads.
//!
//! Every durable write is followed by a check-and-set write of the returned
//! page, so the writer's next read through the cache sees its own edit. A
//! cached history that is already longer is kept: histories only grow, so
//! the longer one is the newer.
//! Appends carry no optimistic-lock check: two writers editing from the same
//! snapshot both land, in whichever order the store serializes them.

use std::sync::Arc;

use chrono::Utc;
use versawiki_cache::CoherentCache;
use versawiki_core::error::CoreError;
use versawiki_core::history::{check_edit, PageVersion, VersionSummary};
use versawiki_core::types::VersionNumber;
use versawiki_core::validation::validate_page_path;
use versawiki_db::models::page::Page;
use versawiki_db::store::PageStore;
use versawiki_db::StoreError;

use crate::error::{WikiError, WikiResult};
use crate::keys;

/// What [`PageVersionStore::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Appended,
}

/// Pages, read through and written through the cache.
#[derive(Clone)]
pub struct PageVersionStore {
    pages: Arc<dyn PageStore>,
    cache: CoherentCache,
}

impl PageVersionStore {
    pub fn new(pages: Arc<dyn PageStore>, cache: CoherentCache) -> Self {
        Self { pages, cache }
    }

    /// Cache-first lookup by exact path.
    pub async fn find(&self, path: &str) -> WikiResult<Option<Page>> {
        let pages = &self.pages;
        self.cache
            .get_or_load(&keys::page(path), move || async move {
                Ok::<_, WikiError>(pages.find_by_path(path).await?)
            })
            .await
    }

    /// Like [`find`](Self::find), but a missing page is [`CoreError::NotFound`].
    pub async fn get(&self, path: &str) -> WikiResult<Page> {
        self.find(path)
            .await?
            .ok_or_else(|| CoreError::not_found("Page", path).into())
    }

    /// Create a page whose history is the single version `content`.
    pub async fn create(&self, path: &str, content: &str) -> WikiResult<Page> {
        validate_page_path(path)?;
        check_edit(None, content)?;

        let page = match self.pages.insert(path, content, Utc::now()).await {
            Ok(page) => page,
            Err(StoreError::Duplicate(_)) => {
                return Err(CoreError::Conflict(format!("Page '{path}' already exists")).into())
            }
            Err(e) => return Err(e.into()),
        };

        self.cache_page(&page).await?;
        tracing::info!(path = %path, "Page created");
        Ok(page)
    }

    /// Append `content` as the next version of `page`.
    ///
    /// Rejected with [`CoreError::NoOp`] if `content` is empty or equals the
    /// latest version of the given snapshot. Returns the stored history,
    /// which includes any versions other writers appended meanwhile.
    pub async fn append(&self, page: &Page, content: &str) -> WikiResult<Page> {
        check_edit(page.latest(), content)?;

        let updated = self
            .pages
            .append_version(&page.path, content, Utc::now())
            .await?
            .ok_or_else(|| CoreError::not_found("Page", page.path.as_str()))?;

        self.cache_page(&updated).await?;
        tracing::info!(
            path = %updated.path,
            version = updated.version_count(),
            "Page version appended"
        );
        Ok(updated)
    }

    /// Create the page at `path` or append to it, whichever applies.
    ///
    /// Losing a creation race to another writer falls through to an append.
    pub async fn save(&self, path: &str, content: &str) -> WikiResult<(Page, SaveOutcome)> {
        if let Some(page) = self.find(path).await? {
            return Ok((self.append(&page, content).await?, SaveOutcome::Appended));
        }

        match self.create(path, content).await {
            Ok(page) => Ok((page, SaveOutcome::Created)),
            Err(WikiError::Core(CoreError::Conflict(_))) => {
                tracing::debug!(path = %path, "Page created concurrently, appending instead");
                let page = self.fetch_fresh(path).await?;
                Ok((self.append(&page, content).await?, SaveOutcome::Appended))
            }
            Err(e) => Err(e),
        }
    }

    /// Read one version of `page`; absent or out-of-range requests give the
    /// latest version.
    pub fn read_version(
        &self,
        page: &Page,
        version: Option<VersionNumber>,
    ) -> WikiResult<PageVersion> {
        Ok(page.read_version(version)?)
    }

    /// The page's versions, newest first.
    pub fn history(&self, page: &Page) -> Vec<VersionSummary> {
        page.history()
    }

    /// Bypass the cache and refresh it from the durable store.
    async fn fetch_fresh(&self, path: &str) -> WikiResult<Page> {
        let page = self
            .pages
            .find_by_path(path)
            .await?
            .ok_or_else(|| CoreError::not_found("Page", path))?;
        self.cache_page(&page).await?;
        Ok(page)
    }

    /// Write `page` through to the cache unless a concurrent writer already
    /// cached a longer history.
    async fn cache_page(&self, page: &Page) -> WikiResult<()> {
        let written = self
            .cache
            .put_unless(&keys::page(&page.path), page, |cached: &Page| {
                cached.version_count() > page.version_count()
            })
            .await?;
        if !written {
            tracing::debug!(path = %page.path, "Cache already holds a longer history");
        }
        Ok(())
    }

    pub(crate) async fn ping(&self) -> WikiResult<()> {
        Ok(self.pages.ping().await?)
    }
}
