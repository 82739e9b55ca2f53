//! docsift Storage Layer
//!
//! File-backed state that survives between batch runs.
//!
//! # Architecture
//!
//! - [`Ledger`]: ordered set of source identifiers already processed
//!   (`processed.json`)
//! - [`ResultStore`]: every record produced so far, one JSON object per
//!   line (`results.jsonl`)
//! - [`Table`] / [`CsvExporter`] / [`XlsxExporter`]: row/column projection
//!   of the records
//! - [`Accumulator`]: merges new records into the persisted set
//!
//! Every file is replaced via temp file + rename, so a crash mid-write
//! leaves the previous version intact.
//!
//! # Examples
//!
//! ```no_run
//! use docsift_store::{Accumulator, CsvExporter, Ledger, ResultStore};
//!
//! let mut ledger = Ledger::load("processed.json")?;
//! if !ledger.is_done("paper.pdf") {
//!     ledger.mark_done("paper.pdf");
//! }
//! ledger.save()?;
//!
//! let accumulator = Accumulator::new(ResultStore::new("results.jsonl"))
//!     .with_exporter(CsvExporter::new("results.csv"));
//! let outcome = accumulator.load_and_merge(Vec::new())?;
//! assert!(!outcome.persisted());
//! # Ok::<(), docsift_store::StoreError>(())
//! ```

#![warn(missing_docs)]

mod accumulator;
mod atomic;
mod ledger;
mod results;
mod table;

pub use accumulator::{Accumulator, ExportFailure, ExportReport, MergeOutcome};
pub use ledger::Ledger;
pub use results::ResultStore;
pub use table::{CsvExporter, Table, TabularExporter, XlsxExporter};

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A state file is not valid JSON
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File being read or written
        path: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// A line of the result store could not be read as a record
    #[error("Corrupt record at {path}:{line}: {reason}")]
    CorruptRecord {
        /// Result store path
        path: String,
        /// 1-based line number
        line: usize,
        /// Parse failure
        reason: String,
    },

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
