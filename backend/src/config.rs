//! Import configuration.
//!
//! Loaded from a JSON file; every key is optional and falls back to the
//! defaults below. Example:
//!
//! ```json
//! {
//!   "vendor": "Acme Pumps",
//!   "collection": "Pumps",
//!   "pricing": { "cost_multiplier": "0.36", "markup_multiplier": "1.21" },
//!   "matching": { "threshold": 0.75, "algorithm": "levenshtein" },
//!   "description": {
//!     "include_weight": true,
//!     "html": true,
//!     "include_columns": ["Model", "Voltage", "Power"],
//!     "exclude_columns": ["Internal Note"],
//!     "footer_link": "https://example.com/manufacturer"
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{SimilarityKind, DEFAULT_THRESHOLD};

/// Appended to the description of heavy products.
pub const DEFAULT_SHIPPING_DISCLAIMER: &str = "NOTE: We will contact you during order fulfilment to discuss shipping and handling costs for products weighing more than 150 pounds. These costs will be billed separately.";

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Vendor when the file has no vendor column.
    pub vendor: String,
    /// Product type when the file has none.
    pub product_type: String,
    /// Tags value when the file has none.
    pub collection: String,
    /// Image URL when the file has none.
    pub image_url: String,
    pub product_category: String,
    pub pricing: PricingConfig,
    /// Products heavier than this (lbs) get the shipping disclaimer.
    pub weight_threshold_lbs: Decimal,
    pub shipping_disclaimer: String,
    pub matching: MatchingConfig,
    /// Row count above which a warning is logged.
    pub large_file_warning_rows: usize,
    pub description: DescriptionConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            vendor: String::new(),
            product_type: String::new(),
            collection: String::new(),
            image_url: String::new(),
            product_category: String::new(),
            pricing: PricingConfig::default(),
            weight_threshold_lbs: Decimal::from(150),
            shipping_disclaimer: DEFAULT_SHIPPING_DISCLAIMER.to_string(),
            matching: MatchingConfig::default(),
            large_file_warning_rows: 1000,
            description: DescriptionConfig::default(),
        }
    }
}

/// `price = list × cost_multiplier × markup_multiplier`, `cost = list × cost_multiplier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub cost_multiplier: Decimal,
    pub markup_multiplier: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cost_multiplier: Decimal::new(36, 2),
            markup_multiplier: Decimal::new(121, 2),
        }
    }
}

/// Header matching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum score, inclusive.
    pub threshold: f64,
    pub algorithm: SimilarityKind,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            algorithm: SimilarityKind::default(),
        }
    }
}

/// How `Body (HTML)` is built.
///
/// With the defaults the body is the source description, plus the
/// disclaimer for heavy products, joined by spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    /// Add `Weight: <w> lbs` to physical product descriptions.
    pub include_weight: bool,
    /// Render HTML blocks; unmapped source columns get a block each.
    pub html: bool,
    /// Source headers listed as `Label: value` lines, in this order.
    pub include_columns: Vec<String>,
    /// Source headers never rendered.
    pub exclude_columns: Vec<String>,
    /// Manufacturer link appended last.
    pub footer_link: Option<String>,
    /// Link text in HTML mode.
    pub footer_text: String,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            include_weight: false,
            html: false,
            include_columns: Vec::new(),
            exclude_columns: Vec::new(),
            footer_link: None,
            footer_text: "View Manufacturer Website".to_string(),
        }
    }
}

impl ImportConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from a path when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate JSON text.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.matching.threshold) {
            return Err(invalid(
                "matching.threshold",
                format!("{} is not between 0 and 1", self.matching.threshold),
            ));
        }
        if self.pricing.cost_multiplier.is_sign_negative() {
            return Err(invalid("pricing.cost_multiplier", "must not be negative"));
        }
        if self.pricing.markup_multiplier.is_sign_negative() {
            return Err(invalid("pricing.markup_multiplier", "must not be negative"));
        }
        if self.weight_threshold_lbs.is_sign_negative() {
            return Err(invalid("weight_threshold_lbs", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.pricing.cost_multiplier.to_string(), "0.36");
        assert_eq!(config.pricing.markup_multiplier.to_string(), "1.21");
        assert_eq!(config.weight_threshold_lbs, Decimal::from(150));
        assert_eq!(config.matching.threshold, 0.70);
        assert_eq!(config.large_file_warning_rows, 1000);
        assert!(!config.description.include_weight);
        assert!(!config.description.html);
        assert!(config.description.include_columns.is_empty());
        assert!(config.description.footer_link.is_none());
        assert!(config.shipping_disclaimer.contains("150 pounds"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ImportConfig::from_json(
            r#"{"vendor": "Acme", "matching": {"algorithm": "levenshtein"}}"#,
        )
        .unwrap();
        assert_eq!(config.vendor, "Acme");
        assert_eq!(config.matching.algorithm, SimilarityKind::Levenshtein);
        assert_eq!(config.matching.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.pricing, PricingConfig::default());
    }

    #[test]
    fn test_description_options() {
        let config = ImportConfig::from_json(
            r#"{"description": {"html": true, "include_columns": ["Model", "Power"], "footer_link": "https://example.com"}}"#,
        )
        .unwrap();
        assert!(config.description.html);
        assert_eq!(config.description.include_columns, vec!["Model", "Power"]);
        assert_eq!(config.description.footer_link.as_deref(), Some("https://example.com"));
        assert_eq!(config.description.footer_text, "View Manufacturer Website");
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(ImportConfig::from_json("{}").unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_multipliers_from_strings() {
        let config = ImportConfig::from_json(
            r#"{"pricing": {"cost_multiplier": "0.5", "markup_multiplier": "2"}}"#,
        )
        .unwrap();
        assert_eq!(config.pricing.cost_multiplier, Decimal::new(5, 1));
        assert_eq!(config.pricing.markup_multiplier, Decimal::from(2));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = ImportConfig::from_json(r#"{"matching": {"threshold": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "matching.threshold"));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let err = ImportConfig::from_json(r#"{"matching": {"algorithm": "soundex"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"collection": "Pumps", "weight_threshold_lbs": 100}}"#).unwrap();

        let config = ImportConfig::load(file.path()).unwrap();
        assert_eq!(config.collection, "Pumps");
        assert_eq!(config.weight_threshold_lbs, Decimal::from(100));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImportConfig::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(ImportConfig::load_or_default(None).unwrap(), ImportConfig::default());
    }
}
