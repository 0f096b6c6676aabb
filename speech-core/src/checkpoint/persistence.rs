//! Checkpoint persistence: loading and atomically saving the record.

use super::types::CheckpointRecord;
use crate::error::Result;
use chrono::Utc;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Compute a fingerprint of a document's page texts.
///
/// Returns the first 16 hex characters of a SHA256 over all pages.
pub fn compute_document_hash(pages: &[String]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(page.as_bytes());
        // Page separator, so ["ab"] and ["a", "b"] differ
        hasher.update(b"\x0c");
    }
    let result = hasher.finalize();

    format!("{:x}", result)[..16].to_string()
}

/// Load the checkpoint at `path`.
///
/// A missing file yields an empty record. An unreadable or corrupt file is
/// logged and also yields an empty record, so the run starts fresh.
pub fn load(path: &Path) -> CheckpointRecord {
    if !path.exists() {
        debug!("No checkpoint at {}", path.display());
        return CheckpointRecord::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read checkpoint {} ({}); starting fresh.", path.display(), e);
            return CheckpointRecord::default();
        }
    };

    match serde_json::from_str::<CheckpointRecord>(&content) {
        Ok(record) => {
            debug!(
                "Loaded checkpoint {} with {} completed page(s)",
                path.display(),
                record.completed_count()
            );
            record
        }
        Err(e) => {
            warn!("Could not parse checkpoint {} ({}); starting fresh.", path.display(), e);
            CheckpointRecord::default()
        }
    }
}

/// Save the checkpoint to `path`, replacing any previous file atomically.
///
/// The record is written to a temporary file in the same directory and then
/// renamed over the target, so readers see either the old or the new record.
pub fn save(path: &Path, record: &CheckpointRecord) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut record = record.clone();
    record.updated_at = Some(Utc::now());

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    debug!(
        "Saved checkpoint {}: {:?}",
        path.display(),
        record.completed_pages()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let record = load(&temp_dir.path().join("progress.json"));
        assert_eq!(record, CheckpointRecord::default());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.json");
        fs::write(&path, "{ not json").unwrap();

        let record = load(&path);
        assert_eq!(record.completed_count(), 0);
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.json");
        fs::write(&path, r#"{"completed_pages": "all"}"#).unwrap();

        assert_eq!(load(&path).completed_count(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut record = CheckpointRecord::new("0123456789abcdef");
        record.mark_completed(4);
        record.mark_completed(2);
        save(&path, &record).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.completed_pages(), vec![2, 4]);
        assert_eq!(loaded.document.as_deref(), Some("0123456789abcdef"));
        assert!(loaded.updated_at.is_some());
    }

    #[test]
    fn test_save_writes_sorted_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut record = CheckpointRecord::default();
        record.mark_completed(3);
        record.mark_completed(1);
        save(&path, &record).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["completed_pages"], serde_json::json!([1, 3]));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut record = CheckpointRecord::default();
        record.mark_completed(1);
        save(&path, &record).unwrap();
        record.mark_completed(2);
        save(&path, &record).unwrap();

        assert_eq!(load(&path).completed_pages(), vec![1, 2]);
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("progress.json");

        save(&path, &CheckpointRecord::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_compute_document_hash() {
        let pages = vec!["one".to_string(), "two".to_string()];
        let hash = compute_document_hash(&pages);
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, compute_document_hash(&pages));

        let merged = vec!["onetwo".to_string()];
        assert_ne!(hash, compute_document_hash(&merged));
    }
}
