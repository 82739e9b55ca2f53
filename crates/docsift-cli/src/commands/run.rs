//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::{load_api_settings, load_batch_config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docsift_domain::LlmProvider;
use docsift_extractor::{
    pending_documents, BatchConfig, BatchOrchestrator, BatchSummary, Document, DocumentSource,
    FileTextExtractor,
};
use docsift_llm::CompletionClient;
use docsift_store::{Accumulator, CsvExporter, Ledger, ResultStore, XlsxExporter};
use std::fmt::Display;
use std::path::Path;
use tracing::info;

/// Execute the run command.
pub fn execute_run(args: RunArgs, env_file: Option<&Path>, formatter: &Formatter) -> Result<()> {
    let config = load_batch_config(args.config.as_deref(), args.input)?;
    let documents = DocumentSource::new(&config.input_dir, &config.extensions).discover()?;

    if args.dry_run {
        let ledger = Ledger::load(&config.ledger_path)?;
        println!("{}", formatter.pending(&pending_documents(&documents, &ledger)));
        return Ok(());
    }

    let settings = load_api_settings(env_file)?;
    let client = CompletionClient::new(&settings, config.completion_options())?;
    info!(
        "Using model {} via {}",
        client.model(),
        client.transport_names().join(", ")
    );

    let summary = run_batch(&config, &documents, client)?;
    println!("{}", formatter.batch_summary(&summary));

    if !summary.exports.is_complete() {
        let paths: Vec<String> = summary
            .exports
            .failed
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        return Err(CliError::Export(paths.join(", ")));
    }

    Ok(())
}

/// Process `documents` with `llm` and persist the outcome at the paths
/// named in `config`.
///
/// Per-document failures and export failures are part of the summary;
/// only failures to save results or the ledger are errors.
pub fn run_batch<L>(config: &BatchConfig, documents: &[Document], llm: L) -> Result<BatchSummary>
where
    L: LlmProvider,
    L::Error: Display,
{
    let mut ledger = Ledger::load(&config.ledger_path)?;
    let accumulator = Accumulator::new(ResultStore::new(&config.results_path))
        .with_exporter(CsvExporter::new(&config.csv_path))
        .with_exporter(XlsxExporter::new(&config.xlsx_path))
        .with_source_id_field(config.source_id_field.clone());

    let orchestrator = BatchOrchestrator::new(llm, FileTextExtractor, config);
    Ok(orchestrator.run_and_persist(documents, &mut ledger, &accumulator)?)
}
