//! # Catalog Import - supplier catalogs to Shopify product CSV
//!
//! Reads supplier product files (CSV, XLS, XLSX) whose column names vary from
//! vendor to vendor, matches their headers onto the fixed 53-column Shopify
//! import schema, and writes an import-ready CSV plus a log of skipped rows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Supplier    │────▶│   Parser    │────▶│  Resolver   │────▶│  Transform  │────▶ CSV + error log
//! │ CSV / XLSX  │     │ (auto-enc)  │     │  (fuzzy)    │     │ (rows, grp) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_import::{import_file, ImportOptions};
//! use std::path::Path;
//!
//! let summary = import_file(Path::new("supplier.csv"), ImportOptions::default()).unwrap();
//! println!("{} rows written", summary.rows_written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`schema`] - The 53 canonical Shopify fields and their aliases
//! - [`models`] - Source and output rows
//! - [`parser`] - CSV / spreadsheet reading with auto-detection
//! - [`resolver`] - Fuzzy header matching and saved mappings
//! - [`transform`] - Row transformation, variant grouping, and the run pipeline
//! - [`export`] - CSV and error-log writers
//! - [`config`] - Run configuration
//! - [`logging`] - Tracing setup

// Core modules
pub mod error;
pub mod models;
pub mod schema;

// Configuration
pub mod config;
pub mod logging;

// Parsing
pub mod parser;

// Column resolution
pub mod resolver;

// Transformation
pub mod transform;

// Output
pub mod export;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ExportError,
    ImportError,
    ImportResult,
    ResolveError,
    RowFailure,
    SourceError,
};

// =============================================================================
// Re-exports - Schema & Models
// =============================================================================

pub use schema::{CanonicalField, FieldKind, FIELD_COUNT};

pub use models::{
    OutputRow,
    SourceColumn,
    SourceRow,
    SourceTable,
    ValidationError,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::ImportConfig;

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    read_source,
    parse_csv_bytes,
    parse_spreadsheet,
    detect_encoding,
    detect_delimiter,
    decode_content,
    SourceFormat,
};

// =============================================================================
// Re-exports - Resolver
// =============================================================================

pub use resolver::{
    ColumnMapping,
    ColumnResolver,
    MatchedColumn,
    Similarity,
    SimilarityKind,
    TokenSortRatio,
    NormalizedLevenshtein,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    import_file,
    transform_rows,
    group_variants,
    ExportMode,
    ProductStrategy,
    ImportOptions,
    ImportRun,
    RowTransformer,
    RunSummary,
};
