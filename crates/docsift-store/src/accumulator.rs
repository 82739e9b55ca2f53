//! Result accumulation across runs

use crate::results::ResultStore;
use crate::table::{Table, TabularExporter};
use crate::StoreError;
use docsift_domain::{Record, DEFAULT_SOURCE_ID_FIELD};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// What [`Accumulator::merge_and_persist`] did
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// No new records; nothing was written
    NothingToPersist,
    /// The merged set was written to the result store
    Persisted {
        /// Records that were already persisted
        existing: usize,
        /// Records added by this run
        added: usize,
        /// The consolidated set as written
        records: Vec<Record>,
    },
}

impl MergeOutcome {
    /// Whether anything was written
    pub fn persisted(&self) -> bool {
        matches!(self, MergeOutcome::Persisted { .. })
    }

    /// The consolidated set, when one was written
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            MergeOutcome::NothingToPersist => None,
            MergeOutcome::Persisted { records, .. } => Some(records.as_slice()),
        }
    }
}

/// An export that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    /// Target file
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

/// What [`Accumulator::export`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Export files written
    pub written: Vec<PathBuf>,
    /// Exports that failed; the others were still attempted
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    /// True when no export failed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Merges newly produced records into the persisted result set
pub struct Accumulator {
    store: ResultStore,
    exporters: Vec<Box<dyn TabularExporter>>,
    source_id_field: String,
}

impl Accumulator {
    /// Accumulator over `store` with no tabular exports
    pub fn new(store: ResultStore) -> Self {
        Self {
            store,
            exporters: Vec::new(),
            source_id_field: DEFAULT_SOURCE_ID_FIELD.to_string(),
        }
    }

    /// Add a tabular export derived from the merged set
    pub fn with_exporter(mut self, exporter: impl TabularExporter + 'static) -> Self {
        self.exporters.push(Box::new(exporter));
        self
    }

    /// Field used to spot records whose source appears more than once
    pub fn with_source_id_field(mut self, field: impl Into<String>) -> Self {
        self.source_id_field = field.into();
        self
    }

    /// Existing records first, then new ones, each in original order
    pub fn merge(existing: Vec<Record>, new: Vec<Record>) -> Vec<Record> {
        let mut merged = existing;
        merged.extend(new);
        merged
    }

    /// Read the persisted set and merge `new` into it
    pub fn load_and_merge(&self, new: Vec<Record>) -> Result<MergeOutcome, StoreError> {
        if new.is_empty() {
            info!("No new results; nothing to persist");
            return Ok(MergeOutcome::NothingToPersist);
        }
        let existing = self.store.load()?;
        self.merge_and_persist(existing, new)
    }

    /// Write `existing + new` to the result store in full.
    ///
    /// Skips the write when `new` is empty. Tabular exports are produced
    /// separately by [`export`](Self::export).
    pub fn merge_and_persist(
        &self,
        existing: Vec<Record>,
        new: Vec<Record>,
    ) -> Result<MergeOutcome, StoreError> {
        if new.is_empty() {
            info!("No new results; nothing to persist");
            return Ok(MergeOutcome::NothingToPersist);
        }

        let existing_count = existing.len();
        let added = new.len();
        let records = Self::merge(existing, new);
        self.warn_on_repeated_sources(&records);

        self.store.write_all(&records)?;

        info!(
            "Persisted {} records ({} existing + {} new) to {}",
            records.len(),
            existing_count,
            added,
            self.store.path().display()
        );

        Ok(MergeOutcome::Persisted {
            existing: existing_count,
            added,
            records,
        })
    }

    /// Regenerate every tabular export from `records`.
    ///
    /// Each exporter is attempted even when an earlier one fails. The
    /// result store is the source of truth, so failures are reported
    /// rather than returned as errors.
    pub fn export(&self, records: &[Record]) -> ExportReport {
        let table = Table::from_records(records);
        let mut report = ExportReport::default();

        for exporter in &self.exporters {
            let path = exporter.path().to_path_buf();
            match exporter.export(&table) {
                Ok(()) => {
                    info!("Exported {} rows to {}", table.rows.len(), path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    warn!("Export to {} failed: {}", path.display(), e);
                    report.failed.push(ExportFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// The ledger normally prevents repeats; they are kept but reported
    fn warn_on_repeated_sources(&self, records: &[Record]) {
        let mut seen = HashSet::new();
        for id in records
            .iter()
            .filter_map(|r| r.source_id(&self.source_id_field))
        {
            if !seen.insert(id) {
                warn!("Source '{}' appears more than once in the result set", id);
            }
        }
    }
}
