//! Page model: a path plus its append-only version history.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use versawiki_core::error::CoreError;
use versawiki_core::history::{self, PageVersion, VersionSummary};
use versawiki_core::types::{Timestamp, VersionNumber};

/// A row from the `pages` table.
///
/// `content` and `modified_at` always have the same, non-zero length.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Page {
    pub path: String,
    pub content: Vec<String>,
    pub modified_at: Vec<Timestamp>,
}

impl Page {
    /// A freshly created page with a single version.
    pub fn new(path: impl Into<String>, content: impl Into<String>, at: Timestamp) -> Self {
        Self {
            path: path.into(),
            content: vec![content.into()],
            modified_at: vec![at],
        }
    }

    pub fn version_count(&self) -> usize {
        self.content.len()
    }

    /// Content of the newest version, if the history is not empty.
    pub fn latest(&self) -> Option<&str> {
        self.content.last().map(String::as_str)
    }

    /// Extend both sequences together.
    pub fn push_version(&mut self, content: impl Into<String>, at: Timestamp) {
        self.content.push(content.into());
        self.modified_at.push(at);
    }

    /// Read a version; out-of-range requests clamp to the latest.
    pub fn read_version(&self, requested: Option<VersionNumber>) -> Result<PageVersion, CoreError> {
        history::read_version(&self.content, &self.modified_at, requested)
    }

    /// Version listing, newest first.
    pub fn history(&self) -> Vec<VersionSummary> {
        history::summarize(&self.content, &self.modified_at)
    }
}
