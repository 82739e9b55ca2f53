//! Error types for the batch pipeline

use crate::normalizer::NormalizeError;
use docsift_store::StoreError;
use thiserror::Error;

/// Errors that can occur while processing a batch
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Source document could not be read
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Source document yielded no text
    #[error("No text extracted")]
    EmptyText,

    /// LLM provider error, after the client's own retries
    #[error("LLM error: {0}")]
    Llm(String),

    /// Reply held no usable structured object
    #[error("Malformed response: {0}")]
    Malformed(#[from] NormalizeError),

    /// Ledger or result store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
