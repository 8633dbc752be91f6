//! Platform extractors behind a common capability trait.
//!
//! Each marketplace gets one `Extractor` implementation; dispatch
//! happens once through [`extractor_for`] keyed by the detected
//! platform. Every capability method is best-effort: a missing
//! selector or malformed blob yields an empty default, never an error,
//! and no method shares mutable state with another.

pub mod context;
pub mod platform;
pub mod selectors;

mod aliexpress;
mod amazon;
mod ebay;
mod generic;
mod shein;
mod temu;
mod walmart;

pub use context::PageContext;
pub use platform::Platform;

use crate::model::{
    Money, ProductRecord, ReviewRecord, VariantRecord, VideoRecord, MAX_IMAGES, MAX_REVIEWS,
    MAX_VIDEOS,
};
use crate::normalize::image;
use crate::variants::DEFAULT_MAX_COMBINATIONS;
use std::collections::BTreeMap;
use tracing::debug;

/// Title/brand/description/sku slice of an extraction.
#[derive(Debug, Clone, Default)]
pub struct BasicInfo {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub sku: String,
}

/// Pricing slice of an extraction.
#[derive(Debug, Clone)]
pub struct Pricing {
    pub price: Money,
    pub original_price: Option<Money>,
}

impl Default for Pricing {
    fn default() -> Self {
        Self { price: Money::zero("EUR"), original_price: None }
    }
}

/// Collection ceilings applied during assembly.
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    pub max_images: usize,
    pub max_videos: usize,
    pub max_reviews: usize,
    pub max_combinations: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            max_videos: MAX_VIDEOS,
            max_reviews: MAX_REVIEWS,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

/// Capability set every platform adapter implements.
///
/// Defaults fall back to the generic JSON-LD/OpenGraph/DOM strategies,
/// so an adapter only overrides the slices its platform does better.
/// Image methods return raw candidate URLs; normalization and
/// deduplication happen once during assembly.
pub trait Extractor {
    fn platform(&self) -> Platform;

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        generic::basic_info(ctx)
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        generic::pricing(ctx)
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        generic::images(ctx)
    }

    fn videos(&self, ctx: &PageContext) -> Vec<VideoRecord> {
        generic::videos(ctx, self.platform())
    }

    fn variants(&self, _ctx: &PageContext) -> Vec<VariantRecord> {
        Vec::new()
    }

    fn reviews(&self, ctx: &PageContext) -> Vec<ReviewRecord> {
        generic::reviews(ctx)
    }

    fn specifications(&self, ctx: &PageContext) -> BTreeMap<String, String> {
        generic::specifications(ctx)
    }
}

/// Selects the adapter for a platform.
pub fn extractor_for(platform: Platform) -> Box<dyn Extractor> {
    match platform {
        Platform::AliExpress => Box::new(aliexpress::AliExpressExtractor),
        Platform::Amazon => Box::new(amazon::AmazonExtractor),
        Platform::Ebay => Box::new(ebay::EbayExtractor),
        Platform::Temu => Box::new(temu::TemuExtractor),
        Platform::Shein => Box::new(shein::SheinExtractor),
        Platform::Walmart => Box::new(walmart::WalmartExtractor),
        Platform::Generic => Box::new(generic::GenericExtractor),
    }
}

/// Runs a full extraction with default limits.
pub fn extract(ctx: &PageContext) -> ProductRecord {
    extract_with_limits(ctx, &ExtractLimits::default())
}

/// Runs a full extraction, assembling one canonical record.
///
/// Always returns a record; incompleteness shows up as empty fields
/// and is judged by the completeness report, not by an error.
pub fn extract_with_limits(ctx: &PageContext, limits: &ExtractLimits) -> ProductRecord {
    let platform = ctx.platform();
    let extractor = extractor_for(platform);
    debug!(platform = %platform, url = ctx.url(), "starting extraction");

    let basic = extractor.basic_info(ctx);
    let pricing = extractor.pricing(ctx);
    let images = image::normalize_all(extractor.images(ctx), limits.max_images);
    let mut videos = extractor.videos(ctx);
    videos.truncate(limits.max_videos);
    let mut variants = extractor.variants(ctx);
    variants.truncate(limits.max_combinations);
    let mut reviews = extractor.reviews(ctx);
    reviews.truncate(limits.max_reviews);
    let specifications = extractor.specifications(ctx);

    let external_id = platform
        .extract_external_id(ctx.url())
        .or_else(|| (!basic.sku.is_empty()).then(|| basic.sku.clone()))
        .unwrap_or_default();

    let mut record = ProductRecord::new(external_id, ctx.url(), platform.as_str());
    record.title = basic.title;
    record.brand = basic.brand;
    record.description = basic.description;
    record.sku = basic.sku;
    record.price = pricing.price;
    // A claimed "original" at or below the sale price is noise.
    record.original_price = pricing
        .original_price
        .filter(|original| original.amount > record.price.amount && !original.is_zero());
    record.images = images;
    record.videos = videos;
    record.variants = variants;
    record.reviews = reviews;
    record.specifications = specifications;

    debug!(
        title_len = record.title.len(),
        images = record.images.len(),
        variants = record.variants.len(),
        reviews = record.reviews.len(),
        "extraction complete"
    );

    record
}
