//! Per-input outcomes and batch reports

use docsift_domain::Record;
use docsift_store::{ExportReport, MergeOutcome};
use std::fmt;
use uuid::Uuid;

/// Processing stage of one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Not yet started
    Pending,
    /// Reading the document text
    Extracting,
    /// Waiting on the text-generation service
    Calling,
    /// Recovering the structured object from the reply
    Normalizing,
    /// Record produced and ledger marked
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::Extracting => "extracting",
            Stage::Calling => "calling",
            Stage::Normalizing => "normalizing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why an input was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct SkipReason {
    /// Stage that failed
    pub stage: Stage,
    /// Error message
    pub message: String,
    /// Model reply, kept when normalization failed
    pub raw_reply: Option<String>,
}

impl SkipReason {
    pub(crate) fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            raw_reply: None,
        }
    }
}

/// Terminal state of one input
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// A record was produced and the ledger marked
    Done {
        /// Document identifier
        source_id: String,
    },
    /// The ledger already listed this input; the service was not contacted
    AlreadyDone {
        /// Document identifier
        source_id: String,
    },
    /// Processing failed; the batch moved on
    Skipped {
        /// Document identifier
        source_id: String,
        /// What went wrong
        reason: SkipReason,
    },
}

impl ItemOutcome {
    /// Identifier of the input this outcome belongs to
    pub fn source_id(&self) -> &str {
        match self {
            ItemOutcome::Done { source_id }
            | ItemOutcome::AlreadyDone { source_id }
            | ItemOutcome::Skipped { source_id, .. } => source_id,
        }
    }
}

/// Result of one pass over the inputs, before persistence
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Identifier of this run, for log correlation
    pub run_id: Uuid,
    /// One outcome per input, in processing order
    pub outcomes: Vec<ItemOutcome>,
    /// Records produced by this run, in processing order
    pub records: Vec<Record>,
}

impl BatchReport {
    /// Inputs that produced a record
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Done { .. }))
    }

    /// Inputs skipped because the ledger already listed them
    pub fn already_done(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::AlreadyDone { .. }))
    }

    /// Inputs that failed
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Result of a batch run including persistence
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Per-input outcomes and new records
    pub report: BatchReport,
    /// What the accumulator wrote
    pub merge: MergeOutcome,
    /// Tabular exports written or failed
    pub exports: ExportReport,
    /// Ledger size after the run
    pub ledger_size: usize,
}
