//! The fixed 53-column Shopify product schema.
//!
//! Every output file has exactly these columns, in [`CanonicalField::ALL`]
//! order. A field either carries supplier aliases (it can be fed by a source
//! column), or is computed / defaulted by the row transformer.

use serde::{Deserialize, Serialize};

/// How a field's value is read from a source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Copied as trimmed text.
    Text,
    /// Must parse as a decimal number when present.
    Decimal,
}

/// One of the 53 output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Handle,
    Title,
    BodyHtml,
    Vendor,
    ProductType,
    Tags,
    Published,
    Option1Name,
    Option1Value,
    Option2Name,
    Option2Value,
    Option3Name,
    Option3Value,
    VariantSku,
    VariantGrams,
    VariantWeight,
    VariantInventoryTracker,
    VariantInventoryQty,
    VariantInventoryPolicy,
    VariantFulfillmentService,
    VariantPrice,
    VariantCompareAtPrice,
    VariantCost,
    VariantRequiresShipping,
    VariantTaxable,
    VariantBarcode,
    ProductCategory,
    ImageSrc,
    ImagePosition,
    ImageAltText,
    GiftCard,
    SeoTitle,
    SeoDescription,
    GoogleProductCategory,
    GoogleGender,
    GoogleAgeGroup,
    GoogleMpn,
    GoogleAdwordsGrouping,
    GoogleAdwordsLabels,
    GoogleCondition,
    GoogleCustomProduct,
    GoogleCustomLabel0,
    GoogleCustomLabel1,
    GoogleCustomLabel2,
    GoogleCustomLabel3,
    GoogleCustomLabel4,
    VariantImage,
    VariantWeightUnit,
    VariantTaxCode,
    CostPerItem,
    PriceInternational,
    CompareAtPriceInternational,
    Status,
}

/// Number of output columns.
pub const FIELD_COUNT: usize = 53;

impl CanonicalField {
    /// All fields in output column order.
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        Self::Handle,
        Self::Title,
        Self::BodyHtml,
        Self::Vendor,
        Self::ProductType,
        Self::Tags,
        Self::Published,
        Self::Option1Name,
        Self::Option1Value,
        Self::Option2Name,
        Self::Option2Value,
        Self::Option3Name,
        Self::Option3Value,
        Self::VariantSku,
        Self::VariantGrams,
        Self::VariantWeight,
        Self::VariantInventoryTracker,
        Self::VariantInventoryQty,
        Self::VariantInventoryPolicy,
        Self::VariantFulfillmentService,
        Self::VariantPrice,
        Self::VariantCompareAtPrice,
        Self::VariantCost,
        Self::VariantRequiresShipping,
        Self::VariantTaxable,
        Self::VariantBarcode,
        Self::ProductCategory,
        Self::ImageSrc,
        Self::ImagePosition,
        Self::ImageAltText,
        Self::GiftCard,
        Self::SeoTitle,
        Self::SeoDescription,
        Self::GoogleProductCategory,
        Self::GoogleGender,
        Self::GoogleAgeGroup,
        Self::GoogleMpn,
        Self::GoogleAdwordsGrouping,
        Self::GoogleAdwordsLabels,
        Self::GoogleCondition,
        Self::GoogleCustomProduct,
        Self::GoogleCustomLabel0,
        Self::GoogleCustomLabel1,
        Self::GoogleCustomLabel2,
        Self::GoogleCustomLabel3,
        Self::GoogleCustomLabel4,
        Self::VariantImage,
        Self::VariantWeightUnit,
        Self::VariantTaxCode,
        Self::CostPerItem,
        Self::PriceInternational,
        Self::CompareAtPriceInternational,
        Self::Status,
    ];

    /// Output column header.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Handle => "Handle",
            Self::Title => "Title",
            Self::BodyHtml => "Body (HTML)",
            Self::Vendor => "Vendor",
            Self::ProductType => "Type",
            Self::Tags => "Tags",
            Self::Published => "Published",
            Self::Option1Name => "Option1 Name",
            Self::Option1Value => "Option1 Value",
            Self::Option2Name => "Option2 Name",
            Self::Option2Value => "Option2 Value",
            Self::Option3Name => "Option3 Name",
            Self::Option3Value => "Option3 Value",
            Self::VariantSku => "Variant SKU",
            Self::VariantGrams => "Variant Grams",
            Self::VariantWeight => "Variant Weight",
            Self::VariantInventoryTracker => "Variant Inventory Tracker",
            Self::VariantInventoryQty => "Variant Inventory Qty",
            Self::VariantInventoryPolicy => "Variant Inventory Policy",
            Self::VariantFulfillmentService => "Variant Fulfillment Service",
            Self::VariantPrice => "Variant Price",
            Self::VariantCompareAtPrice => "Variant Compare At Price",
            Self::VariantCost => "Variant Cost",
            Self::VariantRequiresShipping => "Variant Requires Shipping",
            Self::VariantTaxable => "Variant Taxable",
            Self::VariantBarcode => "Variant Barcode",
            Self::ProductCategory => "Product Category",
            Self::ImageSrc => "Image Src",
            Self::ImagePosition => "Image Position",
            Self::ImageAltText => "Image Alt Text",
            Self::GiftCard => "Gift Card",
            Self::SeoTitle => "SEO Title",
            Self::SeoDescription => "SEO Description",
            Self::GoogleProductCategory => "Google Shopping / Google Product Category",
            Self::GoogleGender => "Google Shopping / Gender",
            Self::GoogleAgeGroup => "Google Shopping / Age Group",
            Self::GoogleMpn => "Google Shopping / MPN",
            Self::GoogleAdwordsGrouping => "Google Shopping / AdWords Grouping",
            Self::GoogleAdwordsLabels => "Google Shopping / AdWords Labels",
            Self::GoogleCondition => "Google Shopping / Condition",
            Self::GoogleCustomProduct => "Google Shopping / Custom Product",
            Self::GoogleCustomLabel0 => "Google Shopping / Custom Label 0",
            Self::GoogleCustomLabel1 => "Google Shopping / Custom Label 1",
            Self::GoogleCustomLabel2 => "Google Shopping / Custom Label 2",
            Self::GoogleCustomLabel3 => "Google Shopping / Custom Label 3",
            Self::GoogleCustomLabel4 => "Google Shopping / Custom Label 4",
            Self::VariantImage => "Variant Image",
            Self::VariantWeightUnit => "Variant Weight Unit",
            Self::VariantTaxCode => "Variant Tax Code",
            Self::CostPerItem => "Cost per item",
            Self::PriceInternational => "Price / International",
            Self::CompareAtPriceInternational => "Compare At Price / International",
            Self::Status => "Status",
        }
    }

    /// Supplier header aliases, most specific first.
    ///
    /// Fields with no aliases are never fed from a source column.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Title => &["Title", "Model", "Product Name", "Item Name", "Name"],
            Self::BodyHtml => &["Description", "Product Description", "Body HTML", "Long Description"],
            Self::Vendor => &["Vendor", "Brand", "Manufacturer"],
            Self::ProductType => &["Product Type", "Type"],
            Self::Tags => &["Tags", "Keywords", "Collection"],
            Self::Option1Value => &["Voltage", "Power Spec", "Option1 Value"],
            Self::Option2Value => &["Power HP", "Horsepower", "Option2 Value"],
            Self::Option3Value => &["Color", "Size", "Option3 Value"],
            Self::VariantSku => &["SKU", "Variant SKU", "Part Number", "Article Number", "Item Code"],
            Self::VariantWeight => &["Weight", "Weight lbs", "Product Weight", "Shipping Weight"],
            Self::VariantInventoryQty => &["Quantity", "Stock", "Inventory Qty", "Qty On Hand"],
            Self::VariantPrice => &["List Price", "Base Price", "MSRP", "Retail Price", "Price"],
            Self::VariantBarcode => &["Barcode", "UPC", "EAN", "GTIN"],
            Self::ProductCategory => &["Product Category", "Category"],
            Self::ImageSrc => &["Image", "Image URL", "Image Src", "Picture"],
            Self::GoogleProductCategory => &["Google Product Category"],
            _ => &[],
        }
    }

    /// Whether a row is invalid without a value for this field.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::VariantSku | Self::Title | Self::VariantPrice)
    }

    /// How the source cell is read.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::VariantPrice | Self::VariantWeight => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    /// Position of this field in the output row.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether the resolver should try to match this field.
    pub fn is_mappable(&self) -> bool {
        !self.aliases().is_empty()
    }

    /// Look a field up by its output header (case-insensitive).
    pub fn from_header(header: &str) -> Option<Self> {
        let wanted = header.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.header().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// The 53 output headers, in order.
pub fn headers() -> Vec<&'static str> {
    CanonicalField::ALL.iter().map(|f| f.header()).collect()
}

/// Mappable fields in resolution order: required first, then optional,
/// each group in column order.
pub fn resolution_order() -> Vec<CanonicalField> {
    let (required, optional): (Vec<_>, Vec<_>) = CanonicalField::ALL
        .iter()
        .copied()
        .filter(|f| f.is_mappable())
        .partition(|f| f.is_required());
    required.into_iter().chain(optional).collect()
}
