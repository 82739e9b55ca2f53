//! Status command implementation.

use crate::cli::StatusArgs;
use crate::config::load_batch_config;
use crate::error::Result;
use crate::output::Formatter;
use docsift_extractor::{pending_documents, BatchConfig, DocumentSource};
use docsift_store::{Ledger, ResultStore};
use std::path::PathBuf;

/// Counts shown by `docsift status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Ledger file
    pub ledger_path: PathBuf,
    /// Identifiers in the ledger
    pub processed: usize,
    /// Result store file
    pub results_path: PathBuf,
    /// Records in the result store
    pub records: usize,
    /// Directory scanned for inputs
    pub input_dir: PathBuf,
    /// Inputs found
    pub discovered: usize,
    /// Inputs not yet in the ledger
    pub pending: usize,
}

/// Execute the status command.
pub fn execute_status(args: StatusArgs, formatter: &Formatter) -> Result<()> {
    let config = load_batch_config(args.config.as_deref(), None)?;
    let status = collect_status(&config)?;
    println!("{}", formatter.status(&status));
    Ok(())
}

/// Read the ledger, result store and input directory named in `config`.
pub fn collect_status(config: &BatchConfig) -> Result<StatusReport> {
    let ledger = Ledger::load(&config.ledger_path)?;
    let records = ResultStore::new(&config.results_path).load()?;
    let source = DocumentSource::new(&config.input_dir, &config.extensions);
    let documents = source.discover()?;
    let pending = pending_documents(&documents, &ledger).len();

    Ok(StatusReport {
        ledger_path: config.ledger_path.clone(),
        processed: ledger.len(),
        results_path: config.results_path.clone(),
        records: records.len(),
        input_dir: source.resolved_dir(),
        discovered: documents.len(),
        pending,
    })
}
