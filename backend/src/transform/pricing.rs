//! Number parsing and price formulas.
//!
//! All money math is done in [`Decimal`] and rounded half away from zero to
//! two places, so `100 × 0.36 × 1.21` is exactly `43.56`. Arithmetic is
//! checked: a result that does not fit comes back as `None`.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PricingConfig;

/// Supplier placeholders for "no value".
const PLACEHOLDERS: &[&str] = &["CF", "N/A", "-", "—", "NAN"];

/// Currency symbols and whitespace.
static NUMBER_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s$€£]").expect("valid regex"));

/// `1,234` or `1,234,567.89`: commas group thousands.
static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid regex"));

/// `12,50` or `1234,5`: a decimal comma.
static DECIMAL_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+,\d{1,2}$").expect("valid regex"));

/// True for blank cells and supplier placeholders.
pub fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Parse a numeric cell such as `"$1,234.50"` or `"12,50 €"`.
///
/// Commas are read as thousands separators when they group digits in
/// threes, and as the decimal point when one or two digits follow a single
/// comma. Any other comma makes the value ambiguous and it is rejected.
/// Placeholders are not numbers either; callers decide whether empty is
/// allowed.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let stripped = NUMBER_NOISE.replace_all(raw.trim(), "");
    if stripped.is_empty() {
        return None;
    }

    let cleaned = if !stripped.contains(',') {
        stripped.into_owned()
    } else if THOUSANDS.is_match(&stripped) {
        stripped.replace(',', "")
    } else if DECIMAL_COMMA.is_match(&stripped) {
        stripped.replace(',', ".")
    } else {
        return None;
    };

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Money with exactly two decimals.
pub fn format_money(value: Decimal) -> String {
    let mut rounded = round_money(value);
    rounded.rescale(2);
    rounded.to_string()
}

/// Decimal without trailing zeros (`"200"`, `"12.5"`).
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Whole grams for a weight in pounds, `None` when it does not fit.
pub fn pounds_to_grams(pounds: Decimal) -> Option<i64> {
    let grams_per_lb = Decimal::new(453_592, 3);
    pounds
        .checked_mul(grams_per_lb)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Price and cost formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    cost_multiplier: Decimal,
    markup_multiplier: Decimal,
}

impl Pricing {
    pub fn new(cost_multiplier: Decimal, markup_multiplier: Decimal) -> Self {
        Self {
            cost_multiplier,
            markup_multiplier,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.cost_multiplier, config.markup_multiplier)
    }

    /// Selling price: `list × cost × markup`, rounded once at the end.
    pub fn price(&self, list_price: Decimal) -> Option<Decimal> {
        list_price
            .checked_mul(self.cost_multiplier)?
            .checked_mul(self.markup_multiplier)
            .map(round_money)
    }

    /// Unit cost: `list × cost`.
    pub fn cost(&self, list_price: Decimal) -> Option<Decimal> {
        list_price.checked_mul(self.cost_multiplier).map(round_money)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}
