//! Error types for the CLI application.

use docsift_extractor::ExtractorError;
use docsift_llm::LlmError;
use docsift_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote call client error
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Batch pipeline error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Ledger or result store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Results were saved but a tabular export could not be written
    #[error("Export failed: {0}")]
    Export(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
