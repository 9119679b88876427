//! Column resolver: fuzzy-match supplier headers onto the canonical schema.
//!
//! # Algorithm
//!
//! ```text
//! for field in required fields, then optional fields (column order):
//!     for column in unclaimed columns (left to right):
//!         score = max(similarity(column, alias) for alias in field.aliases)
//!     best = highest score, leftmost on ties
//!     if best >= threshold: field claims column
//! ```
//!
//! A claimed column is never reassigned, so required fields win alias
//! collisions. If a required field ends unmapped the whole file is rejected.

pub mod mapping;
pub mod similarity;

use tracing::{debug, info, warn};

pub use mapping::{ColumnMapping, MappingEntry, MappingFile, MatchedColumn};
pub use similarity::{
    normalize, NormalizedLevenshtein, Similarity, SimilarityKind, TokenSortRatio,
};

use crate::config::MatchingConfig;
use crate::error::ResolveResult;
use crate::models::SourceColumn;
use crate::schema::{resolution_order, CanonicalField};

/// Default minimum score for a header to match an alias.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// Maps source headers to canonical fields.
pub struct ColumnResolver {
    similarity: Box<dyn Similarity>,
    threshold: f64,
}

impl ColumnResolver {
    /// Resolver with an explicit metric and threshold.
    pub fn new(similarity: Box<dyn Similarity>, threshold: f64) -> Self {
        Self {
            similarity,
            threshold,
        }
    }

    /// Resolver configured from the `matching` section of the config.
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.algorithm.build(), config.threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best alias score of a header for a field.
    pub fn score(&self, field: CanonicalField, header: &str) -> f64 {
        field
            .aliases()
            .iter()
            .map(|alias| self.similarity.score(header, alias))
            .fold(0.0, f64::max)
    }

    /// Resolve headers, rejecting the file if a required field is unmapped.
    pub fn resolve(&self, columns: &[SourceColumn]) -> ResolveResult<ColumnMapping> {
        let mapping = self.resolve_partial(columns);
        mapping.ensure_complete(columns)?;

        info!(
            mapped = mapping.len(),
            unmatched = mapping.unmatched(columns).len(),
            "columns resolved"
        );
        Ok(mapping)
    }

    /// Resolve as many fields as possible without the completeness check.
    pub fn resolve_partial(&self, columns: &[SourceColumn]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        let mut claimed = vec![false; columns.len()];

        for field in resolution_order() {
            let mut best: Option<(usize, f64)> = None;

            for (pos, column) in columns.iter().enumerate() {
                if claimed[pos] || column.name.trim().is_empty() {
                    continue;
                }
                let score = self.score(field, &column.name);
                // strictly greater keeps the leftmost column on ties
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((pos, score));
                }
            }

            match best {
                Some((pos, score)) if score >= self.threshold => {
                    let column = columns[pos].clone();
                    debug!(field = %field, column = %column.name, score, "field matched");
                    if mapping.claim(field, column, score).is_ok() {
                        claimed[pos] = true;
                    }
                }
                _ => {
                    if field.is_required() {
                        warn!(field = %field, "no column matched required field");
                    }
                }
            }
        }

        mapping
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new(Box::new(TokenSortRatio), DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    fn columns(names: &[&str]) -> Vec<SourceColumn> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| SourceColumn::new(i, *n))
            .collect()
    }

    fn mapped(mapping: &ColumnMapping, field: CanonicalField) -> Option<&str> {
        mapping.column(field).map(|c| c.name.as_str())
    }

    #[test]
    fn test_resolves_supplier_headers() {
        let cols = columns(&["Part Number", "Model", "Price (List)", "Weight lbs", "Description"]);
        let mapping = ColumnResolver::default().resolve(&cols).unwrap();

        assert_eq!(mapped(&mapping, CanonicalField::VariantSku), Some("Part Number"));
        assert_eq!(mapped(&mapping, CanonicalField::Title), Some("Model"));
        assert_eq!(mapped(&mapping, CanonicalField::VariantPrice), Some("Price (List)"));
        assert_eq!(mapped(&mapping, CanonicalField::VariantWeight), Some("Weight lbs"));
        assert_eq!(mapped(&mapping, CanonicalField::BodyHtml), Some("Description"));
    }

    #[test]
    fn test_naming_variants_all_match_list_price() {
        let resolver = ColumnResolver::default();
        for header in ["List Price", "list_price", "Price (List)", "LIST-PRICE"] {
            let cols = columns(&["SKU", "Title", header]);
            let mapping = resolver.resolve(&cols).unwrap();
            assert_eq!(
                mapped(&mapping, CanonicalField::VariantPrice),
                Some(header),
                "header {header}"
            );
        }
    }

    #[test]
    fn test_missing_required_column_rejects_file() {
        let cols = columns(&["Model", "List Price", "Warehouse"]);
        let err = ColumnResolver::default().resolve(&cols).unwrap_err();
        match err {
            ResolveError::MissingRequired { missing, found } => {
                assert_eq!(missing, vec!["Variant SKU".to_string()]);
                assert_eq!(found.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_low_scores_stay_unmapped() {
        let cols = columns(&["SKU", "Title", "List Price", "Warehouse Bin"]);
        let mapping = ColumnResolver::default().resolve(&cols).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.unmatched(&cols)[0].name, "Warehouse Bin");
    }

    #[test]
    fn test_tie_goes_to_leftmost_column() {
        // Both normalize to "sku"
        let cols = columns(&["Title", "List Price", "sku", "SKU"]);
        let mapping = ColumnResolver::default().resolve(&cols).unwrap();
        assert_eq!(mapping.column(CanonicalField::VariantSku).unwrap().index, 2);
    }

    #[test]
    fn test_column_claimed_by_one_field_only() {
        // Both headers are exact aliases of Product Type
        let cols = columns(&["SKU", "Title", "List Price", "Product Type", "Type"]);
        let mapping = ColumnResolver::default().resolve(&cols).unwrap();

        let mut seen = std::collections::HashSet::new();
        for (_, m) in mapping.iter() {
            assert!(seen.insert(m.column.index), "column {} claimed twice", m.column.name);
        }
        assert_eq!(mapped(&mapping, CanonicalField::ProductType), Some("Product Type"));
    }

    /// Scores every pair the same.
    struct Flat(f64);

    impl Similarity for Flat {
        fn score(&self, _header: &str, _alias: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_required_fields_claim_first() {
        let cols = columns(&["a", "b", "c", "d"]);
        let mapping = ColumnResolver::new(Box::new(Flat(1.0)), DEFAULT_THRESHOLD).resolve(&cols).unwrap();

        assert_eq!(mapped(&mapping, CanonicalField::Title), Some("a"));
        assert_eq!(mapped(&mapping, CanonicalField::VariantSku), Some("b"));
        assert_eq!(mapped(&mapping, CanonicalField::VariantPrice), Some("c"));
        // first optional field in column order takes what is left
        assert_eq!(mapped(&mapping, CanonicalField::BodyHtml), Some("d"));
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let cols = columns(&[
            "Item Code", "Product Name", "Base Price", "Brand", "Voltage", "Horsepower",
            "Shipping Weight", "UPC", "Category", "Image URL",
        ]);
        let resolver = ColumnResolver::default();
        let first = resolver.resolve(&cols).unwrap();
        for _ in 0..5 {
            assert_eq!(resolver.resolve(&cols).unwrap(), first);
        }
    }

    #[test]
    fn test_blank_headers_are_ignored() {
        let cols = columns(&["", "SKU", "Title", "List Price"]);
        let mapping = ColumnResolver::default().resolve(&cols).unwrap();
        assert!(mapping.iter().all(|(_, m)| m.column.index != 0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let cols = columns(&["a", "b", "c"]);

        let at = ColumnResolver::new(Box::new(Flat(0.75)), 0.75);
        assert_eq!(at.resolve_partial(&cols).len(), 3);

        let above = ColumnResolver::new(Box::new(Flat(0.75)), 0.76);
        assert!(above.resolve_partial(&cols).is_empty());
        assert!(above.resolve(&cols).is_err());
    }

    #[test]
    fn test_levenshtein_metric_pluggable() {
        let resolver = ColumnResolver::new(Box::new(NormalizedLevenshtein), 0.7);
        let cols = columns(&["sku", "title", "list_price"]);
        let mapping = resolver.resolve(&cols).unwrap();
        assert_eq!(mapping.len(), 3);
    }
}
