//! Batch orchestration
//!
//! Drives each pending document through extract → call → normalize and
//! routes the outcome. A failure affects only the document it happened on.

use crate::config::BatchConfig;
use crate::documents::Document;
use crate::error::ExtractorError;
use crate::normalizer::ResponseNormalizer;
use crate::prompt::PromptBuilder;
use crate::types::{BatchReport, BatchSummary, ItemOutcome, SkipReason, Stage};
use docsift_domain::traits::{LlmProvider, TextExtractor};
use docsift_domain::Record;
use docsift_store::{Accumulator, ExportReport, Ledger};
use std::fmt::Display;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Documents the ledger does not list yet
pub fn pending_documents<'a>(documents: &'a [Document], ledger: &Ledger) -> Vec<&'a Document> {
    documents.iter().filter(|d| !ledger.is_done(&d.id)).collect()
}

/// Runs batches of documents against an LLM provider
pub struct BatchOrchestrator<L, X> {
    llm: L,
    extractor: X,
    prompt: PromptBuilder,
    normalizer: ResponseNormalizer,
    source_id_field: String,
}

impl<L, X> BatchOrchestrator<L, X>
where
    L: LlmProvider,
    L::Error: Display,
    X: TextExtractor,
    X::Error: Display,
{
    /// Create an orchestrator for the given run configuration
    pub fn new(llm: L, extractor: X, config: &BatchConfig) -> Self {
        Self {
            llm,
            extractor,
            prompt: PromptBuilder::new(config.prompt.clone()).with_label(config.text_label.clone()),
            normalizer: ResponseNormalizer::new(config.list_fields.iter().cloned()),
            source_id_field: config.source_id_field.clone(),
        }
    }

    /// The LLM provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Process every document once, marking the ledger in memory.
    ///
    /// Nothing is written to disk.
    pub fn run(&self, documents: &[Document], ledger: &mut Ledger) -> BatchReport {
        let run_id = Uuid::now_v7();
        let span = info_span!("batch", %run_id);
        let _guard = span.enter();

        info!("Starting batch over {} documents", documents.len());

        let mut outcomes = Vec::with_capacity(documents.len());
        let mut records = Vec::new();

        for document in documents {
            let outcome = if ledger.is_done(&document.id) {
                info!("Skipping already processed: {}", document.id);
                ItemOutcome::AlreadyDone {
                    source_id: document.id.clone(),
                }
            } else {
                info!("Processing: {}", document.id);
                match self.process(document) {
                    Ok(record) => {
                        records.push(record);
                        ledger.mark_done(document.id.clone());
                        info!("Successfully processed: {}", document.id);
                        ItemOutcome::Done {
                            source_id: document.id.clone(),
                        }
                    }
                    Err(reason) => {
                        warn!(
                            "Skipping {} at stage {}: {}",
                            document.id, reason.stage, reason.message
                        );
                        if let Some(raw) = &reason.raw_reply {
                            warn!("Response for {}: {}", document.id, raw);
                        }
                        ItemOutcome::Skipped {
                            source_id: document.id.clone(),
                            reason,
                        }
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = BatchReport {
            run_id,
            outcomes,
            records,
        };
        info!(
            "Batch finished: {} processed, {} already done, {} skipped",
            report.processed(),
            report.already_done(),
            report.skipped()
        );
        report
    }

    /// Run the batch, persist new records, save the ledger, then regenerate
    /// the tabular exports.
    ///
    /// Results are written before the ledger so that a failure in between
    /// causes reprocessing rather than lost records. Exports come last and
    /// their failures land in [`BatchSummary::exports`], so a bad export
    /// target never leaves the ledger behind the result store.
    ///
    /// # Errors
    ///
    /// Returns an error only when the result store or the ledger cannot be
    /// written; per-document failures are reported in the summary.
    pub fn run_and_persist(
        &self,
        documents: &[Document],
        ledger: &mut Ledger,
        accumulator: &Accumulator,
    ) -> Result<BatchSummary, ExtractorError> {
        let report = self.run(documents, ledger);

        let merge = accumulator.load_and_merge(report.records.clone())?;
        ledger.save()?;

        let exports = match merge.records() {
            Some(records) => accumulator.export(records),
            None => ExportReport::default(),
        };

        Ok(BatchSummary {
            report,
            merge,
            exports,
            ledger_size: ledger.len(),
        })
    }

    /// Take one document from `Pending` to `Done`
    fn process(&self, document: &Document) -> Result<Record, SkipReason> {
        debug!("{}: {} -> {}", document.id, Stage::Pending, Stage::Extracting);
        let text = self
            .extractor
            .extract_text(&document.path)
            .map_err(|e| SkipReason::new(Stage::Extracting, e.to_string()))?;
        if text.trim().is_empty() {
            return Err(SkipReason::new(
                Stage::Extracting,
                ExtractorError::EmptyText.to_string(),
            ));
        }

        let prompt = self.prompt.build(&text);
        debug!(
            "{}: {} ({} chars of text, {} chars of prompt)",
            document.id,
            Stage::Calling,
            text.chars().count(),
            prompt.chars().count()
        );
        let reply = self
            .llm
            .generate(&prompt)
            .map_err(|e| SkipReason::new(Stage::Calling, ExtractorError::Llm(e.to_string()).to_string()))?;
        if reply.trim().is_empty() {
            return Err(SkipReason::new(Stage::Calling, "Empty response"));
        }

        debug!(
            "{}: {} ({} chars)",
            document.id,
            Stage::Normalizing,
            reply.chars().count()
        );
        let object = self.normalizer.extract_object(&reply).map_err(|e| SkipReason {
            stage: Stage::Normalizing,
            message: ExtractorError::Malformed(e).to_string(),
            raw_reply: Some(reply.clone()),
        })?;

        debug!("{}: {}", document.id, Stage::Done);
        Ok(Record::finalize(object, &self.source_id_field, &document.id))
    }
}
