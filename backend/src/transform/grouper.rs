//! Group output rows that share a handle into one product with variants.
//!
//! Shopify treats consecutive rows with the same Handle as variants of one
//! product, and only the first row carries the product image.
//!
//! ```text
//! Transformed rows                 Grouped rows
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │ pump-x  230V  img.png    │     │ pump-x  230V  img.png    │
//! │ valve-y  -    img2.png   │  →  │ pump-x  400V  (no image) │
//! │ pump-x  400V  img.png    │     │ valve-y  -    img2.png   │
//! └──────────────────────────┘     └──────────────────────────┘
//! ```
//!
//! Handles keep their first-appearance order and rows keep their order
//! within a handle. No row is ever dropped.

use std::collections::HashMap;

use tracing::debug;

use crate::models::OutputRow;
use crate::schema::CanonicalField;

/// Product-level image columns, blanked on every variant row but the first.
const PRODUCT_IMAGE_FIELDS: [CanonicalField; 4] = [
    CanonicalField::ImageSrc,
    CanonicalField::ImagePosition,
    CanonicalField::ImageAltText,
    CanonicalField::VariantImage,
];

/// Reorder rows so variants of the same handle are adjacent.
pub fn group_variants(rows: Vec<OutputRow>) -> Vec<OutputRow> {
    let total = rows.len();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProductGroup> = Vec::new();

    for row in rows {
        let handle = row.get(CanonicalField::Handle).to_string();
        let slot = *index.entry(handle).or_insert_with(|| {
            groups.push(ProductGroup::default());
            groups.len() - 1
        });
        groups[slot].add(row);
    }

    let with_variants = groups.iter().filter(|g| g.rows.len() > 1).count();
    if with_variants > 0 {
        debug!(
            products = groups.len(),
            with_variants,
            rows = total,
            "grouped variant rows"
        );
    }

    groups.into_iter().flat_map(ProductGroup::build).collect()
}

/// Rows accumulated for one handle.
#[derive(Default)]
struct ProductGroup {
    rows: Vec<OutputRow>,
}

impl ProductGroup {
    fn add(&mut self, row: OutputRow) {
        self.rows.push(row);
    }

    fn build(self) -> Vec<OutputRow> {
        let blank: Vec<(CanonicalField, &str)> =
            PRODUCT_IMAGE_FIELDS.iter().map(|f| (*f, "")).collect();

        self.rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| if i == 0 { row } else { row.with_overrides(&blank) })
            .collect()
    }
}
