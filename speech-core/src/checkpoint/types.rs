//! Checkpoint data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted record of pages whose audio output is complete.
///
/// `completed_pages` is a sorted set, so it always serializes ascending and
/// without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// 1-based indices of completed pages
    #[serde(default)]
    pub completed_pages: BTreeSet<usize>,
    /// Fingerprint of the document this record belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// When the record was last saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckpointRecord {
    /// Create an empty record for the given document fingerprint.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            completed_pages: BTreeSet::new(),
            document: Some(document.into()),
            updated_at: None,
        }
    }

    /// Whether the page has already been completed.
    pub fn contains(&self, page: usize) -> bool {
        self.completed_pages.contains(&page)
    }

    /// Record a page as completed.
    pub fn mark_completed(&mut self, page: usize) {
        self.completed_pages.insert(page);
    }

    /// Completed pages in ascending order.
    pub fn completed_pages(&self) -> Vec<usize> {
        self.completed_pages.iter().copied().collect()
    }

    /// Number of completed pages.
    pub fn completed_count(&self) -> usize {
        self.completed_pages.len()
    }

    /// Whether this record may be resumed for the given document.
    ///
    /// Records without a fingerprint are accepted for any document.
    pub fn matches_document(&self, document: &str) -> bool {
        self.document.as_deref().is_none_or(|d| d == document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_default_is_empty() {
        let record = CheckpointRecord::default();
        assert_eq!(record.completed_count(), 0);
        assert!(record.document.is_none());
        assert!(!record.contains(1));
    }

    #[test]
    fn test_mark_completed_dedups_and_sorts() {
        let mut record = CheckpointRecord::new("abc");
        record.mark_completed(3);
        record.mark_completed(1);
        record.mark_completed(3);
        assert_eq!(record.completed_pages(), vec![1, 3]);
        assert!(record.contains(1));
        assert!(!record.contains(2));
    }

    #[test]
    fn test_serializes_sorted() {
        let mut record = CheckpointRecord::default();
        for page in [5, 2, 9, 2] {
            record.mark_completed(page);
        }
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"completed_pages":[2,5,9]}"#);
    }

    #[test]
    fn test_parse_bare_record() {
        let record: CheckpointRecord =
            serde_json::from_str(r#"{"completed_pages": [3, 1]}"#).unwrap();
        assert_eq!(record.completed_pages(), vec![1, 3]);
        assert!(record.document.is_none());
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn test_matches_document() {
        assert!(CheckpointRecord::default().matches_document("anything"));
        assert!(CheckpointRecord::new("abc").matches_document("abc"));
        assert!(!CheckpointRecord::new("abc").matches_document("def"));
    }
}
