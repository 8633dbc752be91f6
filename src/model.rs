//! Canonical data model for extracted products, variants and reviews.

use crate::normalize::price::calculate_discount;
use crate::normalize::text::{clean_text, sanitize_review_content};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of images kept on a record.
pub const MAX_IMAGES: usize = 30;
/// Maximum number of videos kept on a record.
pub const MAX_VIDEOS: usize = 10;
/// Maximum number of reviews kept on a record (including the summary entry).
pub const MAX_REVIEWS: usize = 50;

/// A normalized monetary value. `amount` is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    /// ISO 4217 code (USD, EUR, ...).
    pub currency: String,
}

impl Money {
    /// Creates a monetary value, clamping negative amounts to zero.
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self { amount: amount.max(0.0), currency: currency.into() }
    }

    /// A zero amount in the given currency.
    pub fn zero(currency: impl Into<String>) -> Self {
        Self { amount: 0.0, currency: currency.into() }
    }

    /// Returns true if no amount was extracted.
    pub fn is_zero(&self) -> bool {
        self.amount == 0.0
    }
}

/// Canonical product record produced by one page extraction.
///
/// Every field is best-effort: extraction never fails, it only leaves
/// fields empty. Completeness is judged downstream by the report module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Platform-specific item identifier (ASIN, eBay item id, ...).
    pub external_id: String,
    /// Source page URL.
    pub url: String,
    /// Detected platform name.
    pub platform: String,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub sku: String,
    /// Current (sale) price.
    pub price: Money,
    /// Pre-discount price, when the page shows one above the sale price.
    pub original_price: Option<Money>,
    /// Deduplicated, highest-resolution image URLs, first-seen order.
    pub images: Vec<String>,
    pub videos: Vec<VideoRecord>,
    pub variants: Vec<VariantRecord>,
    /// May lead with a single summary entry followed by individual reviews.
    pub reviews: Vec<ReviewRecord>,
    /// Key/value attribute table.
    pub specifications: BTreeMap<String, String>,
}

impl ProductRecord {
    /// Creates an empty record for the given identity.
    pub fn new(
        external_id: impl Into<String>,
        url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
            platform: platform.into(),
            title: String::new(),
            brand: String::new(),
            description: String::new(),
            sku: String::new(),
            price: Money::zero("EUR"),
            original_price: None,
            images: Vec::new(),
            videos: Vec::new(),
            variants: Vec::new(),
            reviews: Vec::new(),
            specifications: BTreeMap::new(),
        }
    }

    /// Discount percentage when an original price is present, else None.
    pub fn discount_percent(&self) -> Option<u8> {
        let original = self.original_price.as_ref()?;
        let pct = calculate_discount(original.amount, self.price.amount);
        (pct > 0).then_some(pct)
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// True when all variants share one set of option-axis names.
    ///
    /// A combination with a missing axis is invalid; mixed axis sets mean
    /// the source data was inconsistent and the variants should not be
    /// trusted as a cross-product.
    pub fn variants_consistent(&self) -> bool {
        let mut axes: Option<BTreeSet<&str>> = None;
        for variant in &self.variants {
            let names: BTreeSet<&str> = variant.options.keys().map(String::as_str).collect();
            match &axes {
                Some(first) if *first != names => return false,
                Some(_) => {}
                None => axes = Some(names),
            }
        }
        true
    }

    /// Truncates collection fields to their documented caps.
    pub fn apply_caps(&mut self) {
        self.images.truncate(MAX_IMAGES);
        self.videos.truncate(MAX_VIDEOS);
        self.reviews.truncate(MAX_REVIEWS);
    }
}

/// One value choice on one option axis of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub value: String,
    /// Identifier the platform assigned to this value, when supplied.
    pub source_id: Option<String>,
    pub image_url: Option<String>,
}

impl OptionChoice {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), source_id: None, image_url: None }
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// One point in the option cross-product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: String,
    pub sku: String,
    /// Option-axis name to chosen value, e.g. "Color" -> "Black".
    pub options: BTreeMap<String, OptionChoice>,
    /// Per-variant price; None means "inherits the product price".
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub stock: u32,
    pub available: bool,
}

impl VariantRecord {
    /// Creates a variant with defaults: no pricing data, available.
    pub fn new(id: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            options: BTreeMap::new(),
            price: None,
            original_price: None,
            stock: 0,
            available: true,
        }
    }

    /// Sets stock and derives availability from it.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self.available = stock > 0;
        self
    }

    /// Human-readable label built from the option values.
    pub fn label(&self) -> String {
        let parts: Vec<&str> = self.options.values().map(|c| c.value.as_str()).collect();
        if parts.is_empty() {
            "Default".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

/// Distinguishes the aggregate entry from individual reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Summary,
    Review,
}

/// One customer review, or the single aggregate summary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub kind: ReviewKind,
    pub author: String,
    /// Sanitized body text: tags stripped, length-capped.
    pub content: String,
    pub date: String,
    /// Star rating in [0, 5]. Defaults to 5 when the source is unparseable.
    pub rating: f32,
    /// Summary entries only: review count behind the average.
    pub total_count: Option<u32>,
}

impl ReviewRecord {
    /// Builds an individual review. An unparseable rating defaults to 5
    /// here, at the record boundary - the parser itself returns None.
    pub fn new(
        author: impl Into<String>,
        content: &str,
        date: impl Into<String>,
        rating: Option<f32>,
    ) -> Self {
        Self {
            kind: ReviewKind::Review,
            author: clean_text(&author.into()),
            content: sanitize_review_content(content),
            date: clean_text(&date.into()),
            rating: rating.unwrap_or(5.0).clamp(0.0, 5.0),
            total_count: None,
        }
    }

    /// Builds the aggregate summary entry.
    pub fn summary(average_rating: f32, total_count: u32) -> Self {
        Self {
            kind: ReviewKind::Summary,
            author: String::new(),
            content: String::new(),
            date: String::new(),
            rating: average_rating.clamp(0.0, 5.0),
            total_count: Some(total_count),
        }
    }
}

/// A product video reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub url: String,
    /// Container/codec hint, usually "mp4".
    pub media_type: String,
    pub platform: String,
}

impl VideoRecord {
    pub fn new(
        url: impl Into<String>,
        media_type: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self { url: url.into(), media_type: media_type.into(), platform: platform.into() }
    }
}
