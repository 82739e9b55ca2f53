//! JSON Lines result store

use crate::atomic::write_atomic;
use crate::StoreError;
use docsift_domain::Record;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Line-oriented store of every record produced so far
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every persisted record in file order.
    ///
    /// A missing file yields no records; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CorruptRecord`] for a line that is not a JSON
    /// object, rather than silently dropping it on the next rewrite.
    pub fn load(&self) -> Result<Vec<Record>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).map_err(|e| StoreError::CorruptRecord {
                    path: self.path.display().to_string(),
                    line: idx + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Replace the store with `records`, one compact JSON object per line
    pub fn write_all(&self, records: &[Record]) -> Result<(), StoreError> {
        write_atomic(&self.path, |w| {
            for record in records {
                serde_json::to_writer(&mut *w, record).map_err(|source| StoreError::Json {
                    path: self.path.display().to_string(),
                    source,
                })?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results.jsonl"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results.jsonl"));
        let records = vec![record(json!({"id": 2})), record(json!({"id": 1, "tags": ["x"]}))];

        store.write_all(&records).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\"id\":2}\n{\"id\":1,\"tags\":[\"x\"]}\n");
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_non_ascii_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results.jsonl"));
        store.write_all(&[record(json!({"title": "偏差"}))]).unwrap();
        assert!(fs::read_to_string(store.path()).unwrap().contains("偏差"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(&path, "{\"id\":1}\n\n{\"id\":2}\n").unwrap();
        assert_eq!(ResultStore::new(path).load().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(&path, "{\"id\":1}\n[1, 2]\n").unwrap();

        match ResultStore::new(path).load() {
            Err(StoreError::CorruptRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt record, got {:?}", other),
        }
    }
}
