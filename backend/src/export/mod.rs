//! Run output: the Shopify CSV and the error log.
//!
//! Both files live in the export directory and share one timestamp per run:
//!
//! ```text
//! /exports/shopify_import_20240131_142501.csv
//! /exports/errors_20240131_142501.log
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::models::{OutputRow, ValidationError};
use crate::schema;
use crate::transform::ExportMode;

/// Export directory when none is configured.
pub const DEFAULT_EXPORT_DIR: &str = "/exports";

/// Run timestamp format used in file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Format a run timestamp.
pub fn run_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `<dir>/<name>.csv`, with the mode's default name when none is given.
pub fn output_path(dir: &Path, name: Option<&str>, mode: ExportMode, timestamp: &str) -> PathBuf {
    let file_name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => format!("{}.csv", n.strip_suffix(".csv").unwrap_or(n)),
        None => format!("{}_{}.csv", mode.file_prefix(), timestamp),
    };
    dir.join(file_name)
}

/// `<dir>/errors_<timestamp>.log`
pub fn error_log_path(dir: &Path, timestamp: &str) -> PathBuf {
    dir.join(format!("errors_{timestamp}.log"))
}

/// Write the 53-column CSV: header row, then one line per output row.
pub fn write_csv(path: &Path, rows: &[OutputRow]) -> ExportResult<()> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(schema::headers())?;
    for row in rows {
        writer.write_record(row.values())?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

/// Write one line per skipped row.
pub fn write_error_log(path: &Path, errors: &[ValidationError]) -> ExportResult<()> {
    ensure_parent(path)?;

    let mut content = String::new();
    for error in errors {
        content.push_str(&error.log_line());
        content.push('\n');
    }
    fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), errors = errors.len(), "error log written");
    Ok(())
}

fn ensure_parent(path: &Path) -> ExportResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ExportError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
