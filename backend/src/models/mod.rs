//! Domain models for the import pipeline.
//!
//! - [`SourceColumn`] - a header in the supplier file and its position
//! - [`SourceRow`] - the raw cells of one supplier record
//! - [`SourceTable`] - a whole parsed file
//! - [`OutputRow`] - one 53-column Shopify record
//! - [`ValidationError`] - why a row was skipped

use serde::{Deserialize, Serialize};

use crate::error::RowFailure;
use crate::schema::{CanonicalField, FIELD_COUNT};

// =============================================================================
// Source side
// =============================================================================

/// A header in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    /// Zero-based column position.
    pub index: usize,
    /// Header text as found in the file (trimmed).
    pub name: String,
}

impl SourceColumn {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Raw cells of one source record, addressed by column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    /// One-based data row number (the header row is not counted).
    pub number: usize,
    /// Cell text; spreadsheet numbers are already stringified.
    pub cells: Vec<String>,
}

impl SourceRow {
    pub fn new(number: usize, cells: Vec<String>) -> Self {
        Self { number, cells }
    }

    /// Raw cell at a column, empty when the row is short.
    pub fn cell(&self, column: &SourceColumn) -> &str {
        self.cells
            .get(column.index)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// A fully parsed source file.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// Header row, in file order.
    pub columns: Vec<SourceColumn>,
    /// Data rows, blank rows already dropped.
    pub rows: Vec<SourceRow>,
    /// Detected text encoding (`"xlsx"`/`"xls"` for spreadsheets).
    pub encoding: String,
    /// Detected CSV delimiter, `None` for spreadsheets.
    pub delimiter: Option<char>,
}

impl SourceTable {
    /// Header names in column order.
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Rows as JSON objects keyed by header (for inspection).
    pub fn to_json(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .map(|col| {
                        (
                            col.name.clone(),
                            serde_json::Value::String(row.cell(col).to_string()),
                        )
                    })
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Output side
// =============================================================================

/// One output record with exactly 53 values in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    values: Vec<String>,
}

impl OutputRow {
    /// Build a row from a value function called once per field.
    pub fn from_fn(mut value: impl FnMut(CanonicalField) -> String) -> Self {
        Self {
            values: CanonicalField::ALL.iter().map(|f| value(*f)).collect(),
        }
    }

    /// Value of a field.
    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.index()]
    }

    /// Values in column order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Copy of this row with some fields replaced.
    pub fn with_overrides(&self, overrides: &[(CanonicalField, &str)]) -> Self {
        Self::from_fn(|field| {
            overrides
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| self.get(field).to_string())
        })
    }
}

impl Default for OutputRow {
    fn default() -> Self {
        Self {
            values: vec![String::new(); FIELD_COUNT],
        }
    }
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// One-based data row number.
    pub row: usize,
    /// First field that failed.
    pub field: CanonicalField,
    /// Why it failed.
    #[serde(serialize_with = "serialize_display")]
    pub reason: RowFailure,
    /// Raw value of the failing field.
    pub value: String,
    /// Snapshot of the whole source row.
    pub raw: SourceRow,
}

impl ValidationError {
    /// One error-log line.
    pub fn log_line(&self) -> String {
        format!(
            "row {}: field '{}': {} (value: '{}')",
            self.row, self.field, self.reason, self.value
        )
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.log_line())
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}
