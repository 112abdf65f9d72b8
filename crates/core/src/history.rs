//! Rules for a page's append-only version history.
//!
//! A history is two parallel sequences, `content` and `modified_at`, of equal
//! non-zero length. Version `n` (1-based) is `content[n - 1]`, written at
//! `modified_at[n - 1]`; `modified_at[0]` is the page's creation time.

use serde::Serialize;

use crate::error::{CoreError, NoOpReason};
use crate::types::{Timestamp, VersionNumber};

/// One version of a page as handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVersion {
    /// The version actually returned, after clamping.
    pub version: VersionNumber,
    /// Number of versions the page had when read.
    pub total_versions: usize,
    pub content: String,
    /// When the page was created (first version written).
    pub created_at: Timestamp,
    /// When the returned version was written.
    pub modified_at: Timestamp,
}

/// Entry of a page's history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub version: VersionNumber,
    pub modified_at: Timestamp,
    /// Content length in bytes.
    pub length: usize,
}

/// Decide whether `new_content` may be appended after `latest`.
///
/// Empty content and content identical to the latest version are rejected
/// with distinct [`NoOpReason`]s. `latest` is `None` for a page being created.
pub fn check_edit(latest: Option<&str>, new_content: &str) -> Result<(), CoreError> {
    if new_content.is_empty() {
        return Err(CoreError::NoOp(NoOpReason::Empty));
    }
    if latest == Some(new_content) {
        return Err(CoreError::NoOp(NoOpReason::Unchanged));
    }
    Ok(())
}

/// Map a requested version onto a history of `count` versions.
///
/// Absent, zero, or out-of-range requests clamp to the latest version.
pub fn resolve_version(count: usize, requested: Option<VersionNumber>) -> VersionNumber {
    match requested {
        Some(v) if (1..=count).contains(&v) => v,
        _ => count,
    }
}

/// Ensure the parallel sequences form a valid history.
pub fn check_history(content: &[String], modified_at: &[Timestamp]) -> Result<(), CoreError> {
    if content.is_empty() || content.len() != modified_at.len() {
        return Err(CoreError::Internal(format!(
            "Corrupt page history: {} snapshots, {} timestamps",
            content.len(),
            modified_at.len()
        )));
    }
    Ok(())
}

/// Read one version out of a history, clamping the request.
pub fn read_version(
    content: &[String],
    modified_at: &[Timestamp],
    requested: Option<VersionNumber>,
) -> Result<PageVersion, CoreError> {
    check_history(content, modified_at)?;
    let version = resolve_version(content.len(), requested);
    Ok(PageVersion {
        version,
        total_versions: content.len(),
        content: content[version - 1].clone(),
        created_at: modified_at[0],
        modified_at: modified_at[version - 1],
    })
}

/// List a history newest first.
pub fn summarize(content: &[String], modified_at: &[Timestamp]) -> Vec<VersionSummary> {
    content
        .iter()
        .zip(modified_at)
        .enumerate()
        .rev()
        .map(|(i, (text, at))| VersionSummary {
            version: i + 1,
            modified_at: *at,
            length: text.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn history() -> (Vec<String>, Vec<Timestamp>) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        (
            vec!["Hello".into(), "Hello world".into()],
            vec![t0, t0 + Duration::minutes(5)],
        )
    }

    #[test]
    fn edit_rules() {
        assert!(check_edit(None, "first").is_ok());
        assert!(check_edit(Some("a"), "b").is_ok());
        assert!(matches!(
            check_edit(Some("a"), ""),
            Err(CoreError::NoOp(NoOpReason::Empty))
        ));
        assert!(matches!(
            check_edit(None, ""),
            Err(CoreError::NoOp(NoOpReason::Empty))
        ));
        assert!(matches!(
            check_edit(Some("same"), "same"),
            Err(CoreError::NoOp(NoOpReason::Unchanged))
        ));
    }

    #[test]
    fn noop_reasons_have_distinct_messages() {
        assert_ne!(NoOpReason::Empty.message(), NoOpReason::Unchanged.message());
    }

    #[test]
    fn resolve_clamps_to_latest() {
        assert_eq!(resolve_version(2, None), 2);
        assert_eq!(resolve_version(2, Some(1)), 1);
        assert_eq!(resolve_version(2, Some(2)), 2);
        assert_eq!(resolve_version(2, Some(0)), 2);
        assert_eq!(resolve_version(2, Some(9999)), 2);
    }

    #[test]
    fn read_latest_and_first() {
        let (content, times) = history();

        let latest = read_version(&content, &times, None).unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.total_versions, 2);
        assert_eq!(latest.content, "Hello world");
        assert_eq!(latest.created_at, times[0]);
        assert_eq!(latest.modified_at, times[1]);

        let first = read_version(&content, &times, Some(1)).unwrap();
        assert_eq!(first.content, "Hello");
        assert_eq!(first.created_at, times[0]);
        assert_eq!(first.modified_at, times[0]);
    }

    #[test]
    fn out_of_range_equals_latest() {
        let (content, times) = history();
        assert_eq!(
            read_version(&content, &times, Some(9999)).unwrap(),
            read_version(&content, &times, None).unwrap()
        );
    }

    #[test]
    fn corrupt_history_is_internal_error() {
        let (content, times) = history();
        assert!(matches!(
            read_version(&content, &times[..1], None),
            Err(CoreError::Internal(_))
        ));
        assert!(matches!(
            read_version(&[], &[], None),
            Err(CoreError::Internal(_))
        ));
    }

    #[test]
    fn summary_is_newest_first() {
        let (content, times) = history();
        let summary = summarize(&content, &times);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].version, 2);
        assert_eq!(summary[0].length, "Hello world".len());
        assert_eq!(summary[1].version, 1);
        assert_eq!(summary[1].modified_at, times[0]);
    }
}
