//! Output formatting for the CLI.

use crate::commands::StatusReport;
use colored::{Color, Colorize};
use docsift_extractor::{BatchSummary, Document, ItemOutcome};
use docsift_store::{ExportReport, MergeOutcome};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Per-input table, counts and persistence outcome of a batch.
    pub fn batch_summary(&self, summary: &BatchSummary) -> String {
        let report = &summary.report;
        let mut out = Vec::new();

        if !report.outcomes.is_empty() {
            out.push(self.outcome_table(&report.outcomes));
        }

        let counts = format!(
            "{} processed, {} already done, {} skipped (run {})",
            report.processed(),
            report.already_done(),
            report.skipped(),
            report.run_id
        );
        out.push(if report.skipped() > 0 {
            self.warning(&counts)
        } else {
            self.success(&counts)
        });
        out.push(self.persistence(&summary.merge));
        if let Some(exports) = self.exports(&summary.exports) {
            out.push(exports);
        }
        out.push(self.info(&format!("Ledger holds {} entries", summary.ledger_size)));

        out.join("\n")
    }

    /// One row per input.
    pub fn outcome_table(&self, outcomes: &[ItemOutcome]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Input", "Status", "Detail"]);

        for outcome in outcomes {
            let (status, detail) = match outcome {
                ItemOutcome::Done { .. } => ("done", String::new()),
                ItemOutcome::AlreadyDone { .. } => ("already done", String::new()),
                ItemOutcome::Skipped { reason, .. } => {
                    ("skipped", format!("{}: {}", reason.stage, reason.message))
                }
            };
            builder.push_record([outcome.source_id(), status, detail.as_str()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Describe what the accumulator wrote.
    pub fn persistence(&self, merge: &MergeOutcome) -> String {
        match merge {
            MergeOutcome::NothingToPersist => self.info("No new results to save."),
            MergeOutcome::Persisted {
                existing,
                added,
                records,
            } => self.success(&format!(
                "Saved {} records ({} existing + {} new)",
                records.len(),
                existing,
                added
            )),
        }
    }

    /// Exported files, then one line per export that could not be written.
    /// `None` when nothing was exported.
    pub fn exports(&self, exports: &ExportReport) -> Option<String> {
        let mut lines = Vec::new();
        if !exports.written.is_empty() {
            let paths: Vec<String> = exports
                .written
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            lines.push(self.success(&format!("Exported {}", paths.join(", "))));
        }
        for failure in &exports.failed {
            lines.push(self.warning(&format!(
                "Could not export {}: {}",
                failure.path.display(),
                failure.message
            )));
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    /// Pending inputs for a dry run.
    pub fn pending(&self, documents: &[&Document]) -> String {
        if documents.is_empty() {
            return self.info("Nothing pending.");
        }
        let mut lines = vec![self.info(&format!("{} pending:", documents.len()))];
        lines.extend(documents.iter().map(|d| format!("  {}", d.id)));
        lines.join("\n")
    }

    /// Ledger and result counts.
    pub fn status(&self, status: &StatusReport) -> String {
        let processed = status.processed.to_string();
        let records = status.records.to_string();
        let pending = format!("{} of {}", status.pending, status.discovered);
        let ledger_path = status.ledger_path.display().to_string();
        let results_path = status.results_path.display().to_string();
        let input_dir = status.input_dir.display().to_string();

        let mut builder = Builder::default();
        builder.push_record(["", "Count", "Location"]);
        builder.push_record(["Processed", processed.as_str(), ledger_path.as_str()]);
        builder.push_record(["Results", records.as_str(), results_path.as_str()]);
        builder.push_record(["Pending", pending.as_str(), input_dir.as_str()]);

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), Color::Red)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), Color::Yellow)
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        text.color(color).to_string()
    }
}
