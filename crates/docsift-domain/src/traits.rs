//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the batch pipeline and the
//! collaborators it drives. Implementations live in other crates.

use std::path::Path;

/// Trait for text-generation providers
///
/// Implemented by the infrastructure layer (docsift-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for `prompt`
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for turning a source document into plain text
///
/// Implemented by the application layer (docsift-extractor)
pub trait TextExtractor {
    /// Error type for extraction operations
    type Error;

    /// Extract the full text content of the document at `path`
    fn extract_text(&self, path: &Path) -> Result<String, Self::Error>;
}

impl<T: LlmProvider + ?Sized> LlmProvider for &T {
    type Error = T::Error;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(prompt)
    }
}
