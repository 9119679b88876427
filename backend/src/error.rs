//! Error types for the catalog import pipeline.
//!
//! Errors are split by tier:
//!
//! - [`SourceError`] - reading and parsing the supplier file
//! - [`ResolveError`] - column resolution and mapping files
//! - [`ConfigError`] - configuration loading
//! - [`ExportError`] - writing the output CSV and error log
//! - [`ImportError`] - top-level, file-level fatal errors
//!
//! All of the above abort the run. Row-level problems are not errors in this
//! sense: they are recorded as [`RowFailure`] reasons on a
//! [`crate::models::ValidationError`] and the run continues.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a supplier file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is not one of csv, xls, xlsx.
    #[error("Unsupported file format '{0}' (expected .csv, .xls or .xlsx)")]
    UnsupportedFormat(String),

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    /// Empty file.
    #[error("Source file is empty")]
    EmptyFile,

    /// Header row is missing or blank.
    #[error("No headers found in source file")]
    NoHeaders,
}

impl From<calamine::Error> for SourceError {
    fn from(err: calamine::Error) -> Self {
        SourceError::Spreadsheet(err.to_string())
    }
}

// =============================================================================
// Resolve Errors
// =============================================================================

/// Errors from column resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// One or more required fields could not be matched to a column.
    #[error("Missing required columns: {missing:?} (columns found: {found:?})")]
    MissingRequired {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A mapping file names a field that is not part of the schema.
    #[error("Unknown field in mapping: {0}")]
    UnknownField(String),

    /// A mapping file names a column that is not in this file.
    #[error("Column '{column}' mapped to '{field}' is not present in the source file")]
    ColumnNotFound { field: String, column: String },

    /// A mapping file assigns one column to two fields.
    #[error("Column '{0}' is mapped to more than one field")]
    DuplicateColumn(String),

    /// A mapping file maps one field twice.
    #[error("Field '{0}' is mapped more than once")]
    DuplicateField(String),

    /// A mapping file maps a field that is always computed.
    #[error("Field '{0}' is computed and cannot be mapped to a column")]
    UnmappableField(String),

    /// IO error reading or writing a mapping file.
    #[error("Mapping file IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error in a mapping file.
    #[error("Mapping file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors loading an import configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors writing run output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error on an output path.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Row Failures (recoverable)
// =============================================================================

/// Why a single row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowFailure {
    /// A required field has no value.
    #[error("missing {0}")]
    Missing(String),

    /// The list price did not parse as a number.
    #[error("invalid list_price")]
    InvalidListPrice,

    /// The weight did not parse as a number.
    #[error("invalid weight")]
    InvalidWeight,

    /// Another numeric field did not parse.
    #[error("invalid {0}")]
    InvalidNumber(String),

    /// A number parsed but the computed value does not fit.
    #[error("{0} out of range")]
    OutOfRange(String),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level, file-level fatal errors.
///
/// This is the error returned by [`crate::transform::pipeline::import_file`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Resolve error.
    #[error("Column resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Config error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Every row failed validation.
    #[error("No valid rows to export ({0} rows skipped)")]
    NoValidRows(usize),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for a whole import.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let source_err = SourceError::EmptyFile;
        let import_err: ImportError = source_err.into();
        assert!(import_err.to_string().contains("empty"));

        let resolve_err = ResolveError::MissingRequired {
            missing: vec!["Variant SKU".into()],
            found: vec!["Name".into(), "Cost".into()],
        };
        let import_err: ImportError = resolve_err.into();
        let msg = import_err.to_string();
        assert!(msg.contains("Variant SKU"));
        assert!(msg.contains("Cost"));
    }

    #[test]
    fn test_row_failure_reasons() {
        assert_eq!(RowFailure::InvalidListPrice.to_string(), "invalid list_price");
        assert_eq!(RowFailure::InvalidWeight.to_string(), "invalid weight");
        assert_eq!(
            RowFailure::Missing("Variant SKU".into()).to_string(),
            "missing Variant SKU"
        );
        assert_eq!(
            RowFailure::OutOfRange("weight".into()).to_string(),
            "weight out of range"
        );
    }
}
