//! Transformation module.
//!
//! Turns resolved supplier rows into Shopify rows:
//! - Pricing: decimal parsing and price/cost formulas
//! - Row: one source row to one output row, or a validation error
//! - Grouper: collect variants that share a handle
//! - Pipeline: the import run from file to exported CSV

pub mod grouper;
pub mod pipeline;
pub mod pricing;
pub mod row;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use grouper::group_variants;
pub use pipeline::{import_file, transform_rows, ImportOptions, ImportRun, RunSummary};
pub use pricing::{format_decimal, format_money, is_placeholder, parse_number, Pricing};
pub use row::RowTransformer;

/// Which columns of the output get populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    /// All 53 fields.
    #[default]
    Full,
    /// Handle, Variant SKU and Body (HTML) only.
    DescriptionOnly,
}

impl ExportMode {
    /// Prefix of the default output file name.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ExportMode::Full => "shopify_import",
            ExportMode::DescriptionOnly => "shopify_descriptions",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Full => write!(f, "full"),
            ExportMode::DescriptionOnly => write!(f, "description-only"),
        }
    }
}

/// Physical goods ship and carry weight; digital goods do neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStrategy {
    #[default]
    Physical,
    Digital,
}

impl ProductStrategy {
    /// Value of `Variant Requires Shipping`.
    pub fn requires_shipping(&self) -> &'static str {
        match self {
            ProductStrategy::Physical => "TRUE",
            ProductStrategy::Digital => "FALSE",
        }
    }

    pub fn is_digital(&self) -> bool {
        matches!(self, ProductStrategy::Digital)
    }
}

impl fmt::Display for ProductStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStrategy::Physical => write!(f, "physical"),
            ProductStrategy::Digital => write!(f, "digital"),
        }
    }
}
