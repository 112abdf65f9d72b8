//! Repository for the `pages` table.
//!
//! A page's history lives in two array columns that are only ever extended,
//! both in the same statement, with `array_append`.

use sqlx::PgPool;
use versawiki_core::types::Timestamp;

use crate::models::page::Page;

const COLUMNS: &str = "path, content, modified_at";

/// Create, append and lookup operations for pages. Pages are never deleted.
pub struct PageRepo;

impl PageRepo {
    /// Insert a page with a one-version history.
    ///
    /// Fails on `pk_pages` if the path is taken.
    pub async fn create(
        pool: &PgPool,
        path: &str,
        content: &str,
        at: Timestamp,
    ) -> Result<Page, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (path, content, modified_at)
             VALUES ($1, ARRAY[$2::TEXT], ARRAY[$3::TIMESTAMPTZ])
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(path)
            .bind(content)
            .bind(at)
            .fetch_one(pool)
            .await
    }

    /// Find a page by exact path.
    pub async fn find_by_path(pool: &PgPool, path: &str) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE path = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(path)
            .fetch_optional(pool)
            .await
    }

    /// Append one version and return the full updated history.
    ///
    /// The row lock taken by `UPDATE` serializes concurrent appends; the
    /// returned history may include versions appended by other writers.
    /// Returns `None` if no page exists at `path`.
    pub async fn append_version(
        pool: &PgPool,
        path: &str,
        content: &str,
        at: Timestamp,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!(
            "UPDATE pages SET
                content = array_append(content, $2::TEXT),
                modified_at = array_append(modified_at, $3::TIMESTAMPTZ)
             WHERE path = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(path)
            .bind(content)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
