//! docsift Extractor
//!
//! Turns a directory of documents into structured records using an LLM.
//!
//! # Overview
//!
//! Each pending document is read to text, sent to the model together with
//! the run's instruction, and the reply is normalized into a JSON object
//! tagged with the document's identifier. Documents already listed in the
//! ledger are never sent again.
//!
//! # Architecture
//!
//! ```text
//! Document → TextExtractor → PromptBuilder → LlmProvider → ResponseNormalizer → Record
//!                                                                  ↓
//!                                                    Accumulator + Ledger
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use docsift_extractor::{BatchConfig, BatchOrchestrator, DocumentSource, FileTextExtractor};
//! use docsift_llm::MockProvider;
//! use docsift_store::{Accumulator, CsvExporter, Ledger, ResultStore, XlsxExporter};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::load("docsift.toml")?;
//! let llm = MockProvider::new(r#"{"title": "stub"}"#);
//! let orchestrator = BatchOrchestrator::new(llm, FileTextExtractor, &config);
//!
//! let documents = DocumentSource::new(&config.input_dir, &config.extensions).discover()?;
//! let mut ledger = Ledger::load(&config.ledger_path)?;
//! let accumulator = Accumulator::new(ResultStore::new(&config.results_path))
//!     .with_exporter(CsvExporter::new(&config.csv_path))
//!     .with_exporter(XlsxExporter::new(&config.xlsx_path));
//!
//! let summary = orchestrator.run_and_persist(&documents, &mut ledger, &accumulator)?;
//! println!("Processed: {}", summary.report.processed());
//! println!("Skipped: {}", summary.report.skipped());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod batch;
mod config;
mod documents;
mod error;
mod normalizer;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use batch::{pending_documents, BatchOrchestrator};
pub use config::BatchConfig;
pub use documents::{Document, DocumentSource, FileTextExtractor};
pub use error::ExtractorError;
pub use normalizer::{strip_code_fence, NormalizeError, ResponseNormalizer};
pub use prompt::{PromptBuilder, DEFAULT_TEXT_LABEL};
pub use types::{BatchReport, BatchSummary, ItemOutcome, SkipReason, Stage};
