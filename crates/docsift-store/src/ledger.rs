//! Processing ledger
//!
//! Records which source identifiers have been finalized. The ledger only
//! grows; entries are never removed.

use crate::atomic::write_atomic;
use crate::StoreError;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persisted, insertion-ordered set of processed identifiers
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl Ledger {
    /// Load the ledger stored at `path`.
    ///
    /// A missing or blank file yields an empty ledger (first run).
    /// Duplicate entries in the file are collapsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut ledger = Self {
            path,
            ids: Vec::new(),
            seen: HashSet::new(),
        };

        let contents = match fs::read_to_string(&ledger.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ledger),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(ledger);
        }

        let ids: Vec<String> = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: ledger.path.display().to_string(),
            source,
        })?;
        for id in ids {
            ledger.mark_done(id);
        }

        debug!("Loaded {} ledger entries from {}", ledger.len(), ledger.path.display());
        Ok(ledger)
    }

    /// File backing this ledger
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `id` has been finalized
    pub fn is_done(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record `id` as finalized. Returns `false` if it already was.
    pub fn mark_done(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.ids.push(id);
        true
    }

    /// Identifiers in the order they were finalized
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing has been processed yet
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Write the ledger back to its file, replacing it atomically
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.ids).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        write_atomic(&self.path, |w| {
            w.write_all(json.as_bytes())?;
            Ok(())
        })?;
        debug!("Saved {} ledger entries to {}", self.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(dir.path().join("processed.json")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.is_done("a.pdf"));
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::load(dir.path().join("processed.json")).unwrap();

        assert!(ledger.mark_done("a.pdf"));
        assert!(!ledger.mark_done("a.pdf"));
        assert!(ledger.mark_done("b.pdf"));

        assert_eq!(ledger.ids(), &["a.pdf".to_string(), "b.pdf".to_string()]);
        assert!(ledger.is_done("a.pdf"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");

        let mut ledger = Ledger::load(&path).unwrap();
        ledger.mark_done("b.pdf");
        ledger.mark_done("a.pdf");
        ledger.save().unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.ids(), ledger.ids());
    }

    #[test]
    fn test_duplicates_in_file_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        fs::write(&path, r#"["a.pdf", "b.pdf", "a.pdf"]"#).unwrap();

        let ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        fs::write(&path, "\n").unwrap();
        assert!(Ledger::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Ledger::load(&path), Err(StoreError::Json { .. })));
    }
}
