//! Row/column projection of records

use crate::atomic::write_atomic;
use crate::StoreError;
use docsift_domain::Record;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Records laid out as rows under the union of their field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names in first-seen order
    pub columns: Vec<String>,
    /// One row per record, one cell per column
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Project `records` into a table.
    ///
    /// Columns are every field seen in any record, ordered by first
    /// appearance. A field missing from a record renders as an empty cell.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Cells of the named column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

/// Strings render bare, null renders empty, composites render as compact JSON
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes a [`Table`] to some row/column format
pub trait TabularExporter {
    /// File the export is written to
    fn path(&self) -> &Path;

    /// Write `table`, replacing any previous export
    fn export(&self, table: &Table) -> Result<(), StoreError>;
}

/// Comma-separated export with a header row
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    /// Exporter writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TabularExporter for CsvExporter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn export(&self, table: &Table) -> Result<(), StoreError> {
        write_atomic(&self.path, |w| {
            let mut writer = csv::Writer::from_writer(w);
            writer.write_record(&table.columns)?;
            for row in &table.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

/// Spreadsheet export: one worksheet, bold header row, text cells
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    path: PathBuf,
}

impl XlsxExporter {
    /// Exporter writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn workbook(table: &Table) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, name) in table.columns.iter().enumerate() {
            sheet.write_string_with_format(0, sheet_col(col)?, name.as_str(), &header)?;
        }
        for (idx, row) in table.rows.iter().enumerate() {
            let sheet_row = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, cell) in row.iter().enumerate() {
                // missing fields stay blank
                if !cell.is_empty() {
                    sheet.write_string(sheet_row, sheet_col(col)?, cell.as_str())?;
                }
            }
        }

        Ok(workbook)
    }
}

fn sheet_col(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

impl TabularExporter for XlsxExporter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn export(&self, table: &Table) -> Result<(), StoreError> {
        let bytes = Self::workbook(table)?.save_to_buffer()?;
        write_atomic(&self.path, |w| {
            w.write_all(&bytes)?;
            Ok(())
        })
    }
}
