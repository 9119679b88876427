//! Transform one supplier row into one Shopify row.
//!
//! Validation happens first and stops at the first failing field, in this
//! order: required values (Title, Variant SKU, Variant Price), then every
//! decimal field in resolution order (list price, weight), then the computed
//! price, cost and grams. A row that passes is turned into a full 53-value
//! [`OutputRow`]; nothing partial is ever produced.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::pricing::{format_decimal, format_money, is_placeholder, parse_number, pounds_to_grams, Pricing};
use super::{ExportMode, ProductStrategy};
use crate::config::ImportConfig;
use crate::error::RowFailure;
use crate::models::{OutputRow, SourceColumn, SourceRow, ValidationError};
use crate::resolver::ColumnMapping;
use crate::schema::{resolution_order, CanonicalField, FieldKind};

/// Values shared by several output columns.
struct Resolved<'r> {
    title: &'r str,
    sku: &'r str,
    list_price: Decimal,
    weight: Decimal,
    price: Decimal,
    cost: Decimal,
    grams: i64,
}

/// Applies one mapping, mode and strategy to every row of a file.
pub struct RowTransformer<'a> {
    mapping: &'a ColumnMapping,
    config: &'a ImportConfig,
    pricing: Pricing,
    mode: ExportMode,
    strategy: ProductStrategy,
    /// Configured description columns present in the file, in config order.
    included: Vec<SourceColumn>,
    /// Unmapped columns rendered as extra HTML description blocks.
    extras: Vec<SourceColumn>,
}

impl<'a> RowTransformer<'a> {
    pub fn new(
        mapping: &'a ColumnMapping,
        config: &'a ImportConfig,
        mode: ExportMode,
        strategy: ProductStrategy,
    ) -> Self {
        Self {
            mapping,
            config,
            pricing: Pricing::from_config(&config.pricing),
            mode,
            strategy,
            included: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// Let the description draw on the file's other columns.
    ///
    /// `description.include_columns` are looked up by exact header. Columns
    /// no field claimed become extra blocks, unless excluded, included, or
    /// named like a Shopify header.
    pub fn with_source_columns(mut self, columns: &[SourceColumn]) -> Self {
        let config = self.config;
        let description = &config.description;

        self.included = description
            .include_columns
            .iter()
            .filter_map(|name| columns.iter().find(|c| &c.name == name))
            .cloned()
            .collect();

        self.extras = self
            .mapping
            .unmatched(columns)
            .into_iter()
            .filter(|c| {
                !c.name.is_empty()
                    && !description.include_columns.contains(&c.name)
                    && !description.exclude_columns.contains(&c.name)
                    && CanonicalField::from_header(&c.name).is_none()
            })
            .cloned()
            .collect();
        self
    }

    /// Validate and transform a row.
    pub fn transform(&self, row: &SourceRow) -> Result<OutputRow, ValidationError> {
        for field in resolution_order().into_iter().filter(|f| f.is_required()) {
            if self.value(row, field).is_none() {
                return Err(self.reject(row, field, RowFailure::Missing(field.header().to_string())));
            }
        }

        let numbers = self.numbers(row)?;
        let list_price = numbers
            .get(&CanonicalField::VariantPrice)
            .copied()
            .unwrap_or_default();
        let weight = numbers
            .get(&CanonicalField::VariantWeight)
            .copied()
            .unwrap_or_default();

        let out_of_range = |field, name: &str| self.reject(row, field, RowFailure::OutOfRange(name.to_string()));
        let price = self
            .pricing
            .price(list_price)
            .ok_or_else(|| out_of_range(CanonicalField::VariantPrice, "list_price"))?;
        let cost = self
            .pricing
            .cost(list_price)
            .ok_or_else(|| out_of_range(CanonicalField::VariantPrice, "list_price"))?;
        let grams = pounds_to_grams(weight).ok_or_else(|| out_of_range(CanonicalField::VariantWeight, "weight"))?;

        let resolved = Resolved {
            title: self.value(row, CanonicalField::Title).unwrap_or_default(),
            sku: self.value(row, CanonicalField::VariantSku).unwrap_or_default(),
            list_price,
            weight,
            price,
            cost,
            grams,
        };

        Ok(match self.mode {
            ExportMode::Full => OutputRow::from_fn(|field| self.full_value(row, &resolved, field)),
            ExportMode::DescriptionOnly => OutputRow::from_fn(|field| match field {
                CanonicalField::Handle
                | CanonicalField::VariantSku
                | CanonicalField::BodyHtml => self.full_value(row, &resolved, field),
                _ => String::new(),
            }),
        })
    }

    /// Parse every decimal field that has a value, in resolution order.
    ///
    /// Weight is skipped for digital products.
    fn numbers(&self, row: &SourceRow) -> Result<BTreeMap<CanonicalField, Decimal>, ValidationError> {
        let mut numbers = BTreeMap::new();

        for field in resolution_order()
            .into_iter()
            .filter(|f| f.kind() == FieldKind::Decimal)
        {
            if field == CanonicalField::VariantWeight && self.strategy.is_digital() {
                continue;
            }
            if let Some(raw) = self.value(row, field) {
                let number = parse_number(raw).ok_or_else(|| self.reject(row, field, invalid_number(field)))?;
                numbers.insert(field, number);
            }
        }
        Ok(numbers)
    }

    /// Trimmed cell for a mapped field; `None` when unmapped or a placeholder.
    fn value<'r>(&self, row: &'r SourceRow, field: CanonicalField) -> Option<&'r str> {
        let column = self.mapping.column(field)?;
        non_empty(row.cell(column))
    }

    fn text(&self, row: &SourceRow, field: CanonicalField) -> String {
        self.value(row, field).unwrap_or_default().to_string()
    }

    fn text_or(&self, row: &SourceRow, field: CanonicalField, fallback: &str) -> String {
        self.value(row, field).unwrap_or(fallback).to_string()
    }

    /// Header of the column behind an option value, when that value is set.
    fn option_name(&self, row: &SourceRow, value_field: CanonicalField) -> String {
        match (self.value(row, value_field), self.mapping.column(value_field)) {
            (Some(_), Some(column)) => column.name.clone(),
            _ => String::new(),
        }
    }

    fn image(&self, row: &SourceRow) -> String {
        self.text_or(row, CanonicalField::ImageSrc, &self.config.image_url)
    }

    fn description(&self, row: &SourceRow, weight: Decimal) -> String {
        let config = &self.config.description;
        let physical = !self.strategy.is_digital();

        let base = self.value(row, CanonicalField::BodyHtml);
        let mut labeled: Vec<(String, String)> = self
            .included
            .iter()
            .filter_map(|c| non_empty(row.cell(c)).map(|v| (label(&c.name), v.to_string())))
            .collect();
        if physical && config.include_weight {
            labeled.push(("Weight".to_string(), format!("{} lbs", format_decimal(weight))));
        }
        let disclaimer = (physical && weight > self.config.weight_threshold_lbs)
            .then_some(self.config.shipping_disclaimer.as_str());

        if !config.html {
            let mut parts: Vec<String> = base.map(str::to_string).into_iter().collect();
            parts.extend(labeled.iter().map(|(l, v)| format!("{l}: {v}")));
            parts.extend(disclaimer.map(str::to_string));
            parts.extend(config.footer_link.clone());
            return parts.join(" ");
        }

        let mut html = String::new();
        if let Some(base) = base {
            html.push_str(&format!("<p>{base}</p>"));
        }
        if !labeled.is_empty() {
            let lines: Vec<String> = labeled
                .iter()
                .map(|(l, v)| format!("<strong>{}:</strong> {}", escape_html(l), escape_html(v)))
                .collect();
            html.push_str(&format!("<p>{}</p>", lines.join("<br>")));
        }
        for column in &self.extras {
            if let Some(value) = non_empty(row.cell(column)) {
                html.push_str(&format!(
                    "<p><strong>{}:</strong> {}</p>",
                    escape_html(&column.name),
                    escape_html(value)
                ));
            }
        }
        if let Some(note) = disclaimer {
            html.push_str(&format!("<p><em>{note}</em></p>"));
        }
        if let Some(ref url) = config.footer_link {
            html.push_str(&format!(
                "<p><a href=\"{}\" target=\"_blank\">{}</a></p>",
                escape_html(url),
                escape_html(&config.footer_text)
            ));
        }
        html
    }

    fn full_value(&self, row: &SourceRow, r: &Resolved<'_>, field: CanonicalField) -> String {
        use CanonicalField::*;

        match field {
            Handle => sanitize_handle(r.title),
            Title | ImageAltText | SeoTitle => r.title.to_string(),
            BodyHtml => self.description(row, r.weight),
            Vendor => self.text_or(row, field, &self.config.vendor),
            ProductType => self.text_or(row, field, &self.config.product_type),
            Tags => self.text_or(row, field, &self.config.collection),
            ProductCategory => self.text_or(row, field, &self.config.product_category),
            Published | GiftCard => "FALSE".to_string(),
            Option1Name => self.option_name(row, Option1Value),
            Option2Name => self.option_name(row, Option2Value),
            Option3Name => self.option_name(row, Option3Value),
            Option1Value | Option2Value | Option3Value | VariantInventoryQty | VariantBarcode
            | GoogleProductCategory => self.text(row, field),
            VariantSku | GoogleMpn => r.sku.to_string(),
            VariantGrams => r.grams.to_string(),
            VariantWeight => format_decimal(r.weight),
            VariantInventoryTracker => "shopify".to_string(),
            VariantInventoryPolicy => "deny".to_string(),
            VariantFulfillmentService => "manual".to_string(),
            VariantPrice => format_money(r.price),
            VariantCompareAtPrice => format_money(r.list_price),
            VariantCost | CostPerItem => format_money(r.cost),
            VariantRequiresShipping => self.strategy.requires_shipping().to_string(),
            VariantTaxable | GoogleCustomProduct => "TRUE".to_string(),
            ImageSrc | VariantImage => self.image(row),
            ImagePosition => {
                if self.image(row).is_empty() {
                    String::new()
                } else {
                    "1".to_string()
                }
            }
            SeoDescription => format!("Buy {} online.", r.title),
            GoogleCondition => "new".to_string(),
            VariantWeightUnit => "lb".to_string(),
            Status => "draft".to_string(),
            _ => String::new(),
        }
    }

    fn reject(&self, row: &SourceRow, field: CanonicalField, reason: RowFailure) -> ValidationError {
        let value = self
            .mapping
            .column(field)
            .map(|c| row.cell(c).trim().to_string())
            .unwrap_or_default();

        ValidationError {
            row: row.number,
            field,
            reason,
            value,
            raw: row.clone(),
        }
    }
}

/// Trimmed cell, `None` for blanks and placeholders.
fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

fn invalid_number(field: CanonicalField) -> RowFailure {
    match field {
        CanonicalField::VariantPrice => RowFailure::InvalidListPrice,
        CanonicalField::VariantWeight => RowFailure::InvalidWeight,
        other => RowFailure::InvalidNumber(other.header().to_string()),
    }
}

/// `Power_HP` reads as `Power HP`.
fn label(header: &str) -> String {
    header.replace('_', " ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Shopify handle from a product title.
///
/// `"Pump (Stainless) 1/2"` becomes `"pump-stainless-1-2"`.
pub fn sanitize_handle(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(|c: char| c == ' ' || c == '/', "-")
        .replace(|c: char| c == '(' || c == ')', "")
}
