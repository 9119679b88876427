//! High-level import pipeline.
//!
//! Combines every step of a run: reading the supplier file, resolving its
//! columns, transforming and validating rows, grouping variants, and writing
//! the CSV and error log.
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_import::transform::{import_file, ImportOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = import_file(Path::new("catalog.xlsx"), ImportOptions::default())?;
//!     println!("wrote {} rows to {}", summary.rows_written, summary.output_path.display());
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::grouper::group_variants;
use super::row::RowTransformer;
use super::{ExportMode, ProductStrategy};
use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::export::{self, DEFAULT_EXPORT_DIR};
use crate::models::{OutputRow, SourceTable, ValidationError};
use crate::parser::read_source;
use crate::resolver::{ColumnMapping, ColumnResolver};

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub mode: ExportMode,
    pub strategy: ProductStrategy,
    pub config: ImportConfig,
    /// Directory for the CSV and error log
    pub export_dir: PathBuf,
    /// Output file name without extension; defaults by mode.
    pub output_name: Option<String>,
    /// Apply a saved mapping instead of fuzzy resolution.
    pub mapping_path: Option<PathBuf>,
    /// Save the mapping used by this run.
    pub save_mapping: Option<PathBuf>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::default(),
            strategy: ProductStrategy::default(),
            config: ImportConfig::default(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            output_name: None,
            mapping_path: None,
            save_mapping: None,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    /// Non-blank data rows read
    pub rows_processed: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub output_path: PathBuf,
    /// Present only when at least one row was skipped.
    pub error_log: Option<PathBuf>,
    pub mapped_fields: usize,
    pub unmatched_columns: Vec<String>,
}

/// Transform every row of a table with one mapping.
///
/// Pure: no IO and no run state. Valid rows come back variant-grouped;
/// failed rows come back as errors in source order.
pub fn transform_rows(
    table: &SourceTable,
    mapping: &ColumnMapping,
    mode: ExportMode,
    strategy: ProductStrategy,
    config: &ImportConfig,
) -> (Vec<OutputRow>, Vec<ValidationError>) {
    let transformer = RowTransformer::new(mapping, config, mode, strategy).with_source_columns(&table.columns);

    let mut output = Vec::with_capacity(table.rows.len());
    let mut errors = Vec::new();

    for row in &table.rows {
        match transformer.transform(row) {
            Ok(out) => output.push(out),
            Err(err) => {
                debug!(row = err.row, field = %err.field, reason = %err.reason, "row skipped");
                errors.push(err);
            }
        }
    }

    (group_variants(output), errors)
}

/// Import a supplier file with a fresh run.
pub fn import_file(path: &Path, options: ImportOptions) -> ImportResult<RunSummary> {
    ImportRun::new(options).execute(path)
}

/// One import run.
///
/// Owns the run timestamp, the collected output rows and the skipped-row
/// errors. Nothing is written until every row has been processed.
pub struct ImportRun {
    options: ImportOptions,
    timestamp: String,
    rows: Vec<OutputRow>,
    errors: Vec<ValidationError>,
}

impl ImportRun {
    pub fn new(options: ImportOptions) -> Self {
        Self::with_timestamp(options, export::run_timestamp(Local::now()))
    }

    /// Run with a fixed timestamp.
    pub fn with_timestamp(options: ImportOptions, timestamp: impl Into<String>) -> Self {
        Self {
            options,
            timestamp: timestamp.into(),
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Rows that passed, after variant grouping.
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Rows that were skipped.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Read, transform and export `path`.
    pub fn execute(&mut self, path: &Path) -> ImportResult<RunSummary> {
        let table = read_source(path)?;
        self.process(&table)
    }

    /// Transform and export an already parsed table.
    pub fn process(&mut self, table: &SourceTable) -> ImportResult<RunSummary> {
        let config = &self.options.config;

        if table.rows.len() > config.large_file_warning_rows {
            warn!(
                rows = table.rows.len(),
                limit = config.large_file_warning_rows,
                "large file, processing may take a while"
            );
        }

        let mapping = self.mapping(table)?;
        let unmatched_columns: Vec<String> = mapping
            .unmatched(&table.columns)
            .iter()
            .map(|c| c.name.clone())
            .collect();
        log_mapping(&mapping, &unmatched_columns);

        info!(
            mode = %self.options.mode,
            strategy = %self.options.strategy,
            rows = table.rows.len(),
            "transforming rows"
        );
        let (rows, errors) = transform_rows(
            table,
            &mapping,
            self.options.mode,
            self.options.strategy,
            config,
        );
        self.rows = rows;
        self.errors = errors;
        log_skipped(&self.errors);

        if self.rows.is_empty() {
            return Err(ImportError::NoValidRows(self.errors.len()));
        }

        if let Some(ref save_path) = self.options.save_mapping {
            mapping.save(save_path)?;
        }

        let (output_path, error_log) = self.export()?;

        Ok(RunSummary {
            timestamp: self.timestamp.clone(),
            rows_processed: table.rows.len(),
            rows_written: self.rows.len(),
            rows_skipped: self.errors.len(),
            output_path,
            error_log,
            mapped_fields: mapping.len(),
            unmatched_columns,
        })
    }

    /// Write the CSV, then the error log when rows were skipped.
    ///
    /// A failed error log removes the CSV again, so a failed run leaves no
    /// output file behind.
    fn export(&self) -> ImportResult<(PathBuf, Option<PathBuf>)> {
        let export_dir = &self.options.export_dir;
        let output_path = export::output_path(
            export_dir,
            self.options.output_name.as_deref(),
            self.options.mode,
            &self.timestamp,
        );
        export::write_csv(&output_path, &self.rows)?;

        if self.errors.is_empty() {
            return Ok((output_path, None));
        }

        let log_path = export::error_log_path(export_dir, &self.timestamp);
        if let Err(err) = export::write_error_log(&log_path, &self.errors) {
            if let Err(remove_err) = fs::remove_file(&output_path) {
                warn!(path = %output_path.display(), error = %remove_err, "could not remove csv");
            }
            return Err(err.into());
        }
        Ok((output_path, Some(log_path)))
    }

    /// Saved mapping when one was given, fuzzy resolution otherwise.
    fn mapping(&self, table: &SourceTable) -> ImportResult<ColumnMapping> {
        let mapping = match self.options.mapping_path {
            Some(ref mapping_path) => {
                info!(path = %mapping_path.display(), "applying saved mapping");
                ColumnMapping::load(mapping_path, &table.columns)?
            }
            None => ColumnResolver::from_config(&self.options.config.matching).resolve(&table.columns)?,
        };
        Ok(mapping)
    }
}

fn log_mapping(mapping: &ColumnMapping, unmatched: &[String]) {
    for (field, matched) in mapping.iter() {
        debug!(
            column = %matched.column.name,
            field = %field,
            score = matched.score,
            "mapped"
        );
    }
    if !unmatched.is_empty() {
        info!(columns = ?unmatched, "source columns left unmapped");
    }
}

/// Summarize skipped rows by reason, with a few row numbers each.
fn log_skipped(errors: &[ValidationError]) {
    if errors.is_empty() {
        return;
    }
    warn!(skipped = errors.len(), "rows failed validation");

    let mut by_reason: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for err in errors {
        by_reason
            .entry(format!("{}: {}", err.field, err.reason))
            .or_default()
            .push(err.row);
    }

    for (reason, rows) in by_reason.iter().take(5) {
        let sample: Vec<String> = rows.iter().take(5).map(|r| r.to_string()).collect();
        let more = if rows.len() > 5 {
            format!(" +{}", rows.len() - 5)
        } else {
            String::new()
        };
        warn!("{} (rows: {}{})", reason, sample.join(", "), more);
    }
}
