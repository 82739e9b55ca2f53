//! Input discovery and document-to-text extraction

use crate::error::ExtractorError;
use docsift_domain::TextExtractor;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One candidate input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier tracked by the ledger (the file name)
    pub id: String,
    /// Location on disk
    pub path: PathBuf,
}

impl Document {
    /// Document at `path`, identified by its file name
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let id = path.file_name()?.to_str()?.to_string();
        Some(Self { id, path })
    }
}

/// Enumerates input documents in a directory
#[derive(Debug, Clone)]
pub struct DocumentSource {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl DocumentSource {
    /// Source scanning `dir` for files with one of `extensions`
    pub fn new<I, S>(dir: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dir: dir.into(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Directory actually scanned: the configured one, or the current
    /// directory when it does not exist
    pub fn resolved_dir(&self) -> PathBuf {
        if self.dir.is_dir() {
            self.dir.clone()
        } else {
            PathBuf::from(".")
        }
    }

    /// Matching files, sorted by identifier
    pub fn discover(&self) -> Result<Vec<Document>, ExtractorError> {
        let dir = self.resolved_dir();
        if dir != self.dir {
            warn!(
                "Input directory {} not found, scanning {} instead",
                self.dir.display(),
                dir.display()
            );
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || !self.matches(&path) {
                continue;
            }
            match Document::from_path(&path) {
                Some(doc) => documents.push(doc),
                None => warn!("Skipping file with non UTF-8 name: {}", path.display()),
            }
        }
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        debug!("Discovered {} documents in {}", documents.len(), dir.display());
        Ok(documents)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// Extracts text from PDF and plain-text files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextExtractor;

impl FileTextExtractor {
    fn extract_pdf(path: &Path) -> Result<String, ExtractorError> {
        // pdf-extract panics on some malformed files instead of returning an error
        let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)));
        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractorError::Extraction(format!(
                "Failed to read PDF {}: {}",
                path.display(),
                e
            ))),
            Err(_) => Err(ExtractorError::Extraction(format!(
                "PDF parser aborted on {}",
                path.display()
            ))),
        }
    }
}

impl TextExtractor for FileTextExtractor {
    type Error = ExtractorError;

    fn extract_text(&self, path: &Path) -> Result<String, Self::Error> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Self::extract_pdf(path),
            "txt" | "md" => fs::read_to_string(path).map_err(|e| {
                ExtractorError::Extraction(format!("Failed to read {}: {}", path.display(), e))
            }),
            other => Err(ExtractorError::Extraction(format!(
                "Unsupported document type '{}': {}",
                other,
                path.display()
            ))),
        }
    }
}
